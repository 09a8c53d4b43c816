//! Utility functions and types for debugging and testing the containers.
//!
//! These are not needed for normal use, but are useful during development of
//! both this crate and code built on top of it.

mod checker;
mod display;
mod script;

pub use checker::*;
pub use display::{DisplayRegistry, DisplaySparseSet};
pub use script::*;
