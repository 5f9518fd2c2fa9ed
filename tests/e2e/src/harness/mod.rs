//! Test harness for orchestrator runs

mod recording;

pub use recording::{Behavior, Event, RecordingStages};
