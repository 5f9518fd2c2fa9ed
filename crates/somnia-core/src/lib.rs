//! # Somnia Core
//!
//! Dream narrative analysis engine. Several independent stages score a
//! free-text dream; this crate reconciles their outputs into one
//! internally consistent [`AnalysisBundle`]:
//!
//! - **Concurrent invocation**: emotion first, then quantitative, sleep,
//!   continuity and thematic adapters concurrently
//! - **Merge / Normalize**: one canonical shape, every score on a 0-100 basis
//! - **Validate**: cross-field rules, each with a deterministic correction
//! - **Derive**: metamorphosis, bizarreness and entity signals from the text
//! - **Heal**: presentation-suppression flags for legitimately empty sections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use somnia_core::{Language, Orchestrator, PipelineConfig};
//!
//! let orchestrator = Orchestrator::heuristic(PipelineConfig::load(None)?)?;
//! let result = orchestrator
//!     .orchestrate("My mother turned into a bird and flew away.", Language::En, None, None)
//!     .await?;
//!
//! assert!(result.bundle.has_metamorphosis);
//! assert!(result.bundle.plausibility.physical <= 50.0);
//! ```
//!
//! Stage adapters are plugged in through [`StageSet`]; the built-in
//! [`HeuristicStages`] are lexicon-based reference scorers for English
//! and Turkish.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod bundle;
pub mod config;
pub mod error;
pub mod stages;

/// Text derivation helpers and the shared keyword/pattern tables
pub mod detect;

/// Orchestrator and the five core stages
pub mod pipeline;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Bundle types
pub use bundle::{
    AnalysisBundle, BundleMetadata, Continuity, EmotionIndex, EmotionLabel, EntityCategory,
    EntityIndex, Language, Level, Plausibility, SleepStage, SleepStageKind, TextSignals,
    ThemeIndex, Tone, ValidationResult, Valence, determine_tone, determine_tone_with_threshold,
};

// Configuration and errors
pub use config::{ConfigError, ExtractionSettings, PipelineConfig};
pub use error::{AnalysisError, Result, StageError};

// Stage adapters
pub use stages::{
    ContinuityStage, DemographicsHint, EmotionStage, HeuristicStages, QuantitativeRequest,
    QuantitativeStage, RawAnalysisResults, SleepHints, SleepStageEstimator, StageKind,
    StageResult, StageSet, ThematicStage, Translate,
};

// Text detectors
pub use detect::{Lexicon, LexiconDetectors, TextDetectors};

// Pipeline
pub use pipeline::{OrchestrationResult, Orchestrator, PipelineStage, Rule, StageReport};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        AnalysisBundle, AnalysisError, DemographicsHint, HeuristicStages, Language,
        OrchestrationResult, Orchestrator, PipelineConfig, Result, StageSet, Tone,
    };
}
