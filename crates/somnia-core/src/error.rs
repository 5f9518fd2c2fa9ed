//! Error types
//!
//! Two layers: [`StageError`] is what a stage adapter reports, and
//! [`AnalysisError`] is what the orchestrator hands back to its caller.
//! Invariant violations are not errors; see [`crate::bundle::ValidationResult`].

use crate::config::ConfigError;
use crate::stages::StageKind;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Failure reported by a stage adapter
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    /// The adapter ran but could not produce a result
    #[error("Stage failed: {0}")]
    Failed(String),
    /// The adapter's own deadline expired
    #[error("Stage timed out")]
    Timeout,
    /// The adapter produced output that does not fit its contract
    #[error("Invalid stage output: {0}")]
    InvalidOutput(String),
}

/// Orchestrator error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A stage adapter failed; the whole analysis fails with it
    #[error("{stage} stage failed: {source}")]
    Adapter {
        stage: StageKind,
        #[source]
        source: StageError,
    },
    /// A precondition on the input was violated
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
    /// The caller abandoned the request
    #[error("Analysis cancelled")]
    Cancelled,
    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A built-in pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl AnalysisError {
    /// Wrap an adapter failure with the stage that produced it
    pub fn adapter(stage: StageKind, source: StageError) -> Self {
        Self::Adapter { stage, source }
    }

    /// Stage that failed, if this is an adapter failure
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            Self::Adapter { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Analysis result type
pub type Result<T> = std::result::Result<T, AnalysisError>;
