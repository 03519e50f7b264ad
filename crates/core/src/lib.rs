#![forbid(unsafe_code)]

pub mod adaptive;
pub mod model;
pub mod time;

pub use adaptive::{Difficulty, DifficultyAdapter};
pub use time::Clock;
