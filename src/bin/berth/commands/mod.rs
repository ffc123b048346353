//! Command implementations

pub mod available;
pub mod completions;
pub mod install;
pub mod list;
pub mod probe;
pub mod remove;
