//! API request handlers

mod health;
mod info;
mod solve;

pub use health::*;
pub use info::*;
pub use solve::*;
