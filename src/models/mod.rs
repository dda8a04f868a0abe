//! Core data models for league statistics.

mod hero;
mod primary;
mod report;
mod secondary;
mod unified;

pub use hero::*;
pub use primary::*;
pub use report::*;
pub use secondary::*;
pub use unified::*;
