//! Domain models for the vaccine tracker.

mod catalog;
mod record;
mod submission;

pub use catalog::*;
pub use record::*;
pub use submission::*;
