//! Test fixtures

pub mod fixtures;

pub use fixtures::{RawResultsFactory, dreams};
