//! Client application wiring

pub mod keyboard;
pub mod runner;

pub use runner::{RunSummary, Runner};
