//! Somnia end-to-end test support
//!
//! - [`harness`]: scripted stage doubles that record what the orchestrator does
//! - [`mocks`]: dream texts and raw-result builders

pub mod harness;
pub mod mocks;
