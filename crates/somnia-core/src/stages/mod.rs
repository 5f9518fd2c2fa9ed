//! Stage adapters
//!
//! The five analysis stages are external collaborators. The orchestrator
//! only depends on the traits below; any implementation (lexicon scorer,
//! model-backed extractor, test double) can be plugged in through a
//! [`StageSet`]. Retries and timeouts of network-backed adapters belong
//! to the adapter itself.

mod heuristic;
mod raw;

pub use heuristic::HeuristicStages;
pub use raw::{
    CharacterRaw, CircadianRaw, ContinuityRaw, EmotionRaw, QuantitativeRaw, RawAnalysisResults,
    RealityTesting, SleepRaw, ThematicRaw, ThemeRaw, ValenceTriad,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::bundle::Language;
use crate::config::ExtractionSettings;
use crate::error::StageError;

/// Adapter result type
pub type StageResult<T> = std::result::Result<T, StageError>;

/// Which adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Emotion,
    Quantitative,
    Sleep,
    Continuity,
    Thematic,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Emotion => "emotion",
            StageKind::Quantitative => "quantitative",
            StageKind::Sleep => "sleep",
            StageKind::Continuity => "continuity",
            StageKind::Thematic => "thematic",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// HINTS
// ============================================================================

/// Optional demographic and contextual hints about the dreamer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DemographicsHint {
    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Usual bedtime, forwarded to the sleep adapter
    pub bedtime: Option<NaiveTime>,
}

/// Inputs of the quantitative adapter beyond the text itself
#[derive(Debug, Clone, Copy)]
pub struct QuantitativeRequest<'a> {
    pub demographics: Option<&'a DemographicsHint>,
    /// Already-finalized emotion result
    pub emotion_hint: &'a EmotionRaw,
    pub model_version: &'a str,
    pub settings: &'a ExtractionSettings,
}

/// Hints for the sleep adapter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SleepHints {
    pub bedtime: Option<NaiveTime>,
    /// Intensity of the primary emotion, 0-100
    pub emotion_intensity: Option<f64>,
}

/// Key-based message translation, passed through to the thematic adapter
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str, vars: Option<&BTreeMap<String, String>>) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, Option<&BTreeMap<String, String>>) -> String + Send + Sync,
{
    fn translate(&self, key: &str, vars: Option<&BTreeMap<String, String>>) -> String {
        self(key, vars)
    }
}

// ============================================================================
// ADAPTER CONTRACTS
// ============================================================================

/// Emotion lexicon scorer
#[async_trait]
pub trait EmotionStage: Send + Sync {
    async fn score(&self, text: &str, language: Language) -> StageResult<EmotionRaw>;
}

/// Entity / quantitative extractor. `Ok(None)` means the input was too
/// short to extract anything.
#[async_trait]
pub trait QuantitativeStage: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        language: Language,
        request: QuantitativeRequest<'_>,
    ) -> StageResult<Option<QuantitativeRaw>>;
}

/// Sleep-stage estimator
#[async_trait]
pub trait SleepStageEstimator: Send + Sync {
    async fn estimate(
        &self,
        text: &str,
        hints: SleepHints,
        language: Language,
    ) -> StageResult<SleepRaw>;
}

/// Continuity-with-waking-life scorer
#[async_trait]
pub trait ContinuityStage: Send + Sync {
    async fn score(
        &self,
        text: &str,
        demographics: Option<&DemographicsHint>,
        language: Language,
    ) -> StageResult<ContinuityRaw>;
}

/// Theme / psychological-framework extractor
#[async_trait]
pub trait ThematicStage: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        language: Language,
        translate: Option<&dyn Translate>,
    ) -> StageResult<ThematicRaw>;
}

/// The five adapters an orchestrator runs
#[derive(Clone)]
pub struct StageSet {
    pub emotion: Arc<dyn EmotionStage>,
    pub quantitative: Arc<dyn QuantitativeStage>,
    pub sleep: Arc<dyn SleepStageEstimator>,
    pub continuity: Arc<dyn ContinuityStage>,
    pub thematic: Arc<dyn ThematicStage>,
}

impl StageSet {
    /// Use one value for all five contracts
    pub fn uniform<T>(stages: Arc<T>) -> Self
    where
        T: EmotionStage
            + QuantitativeStage
            + SleepStageEstimator
            + ContinuityStage
            + ThematicStage
            + 'static,
    {
        Self {
            emotion: stages.clone(),
            quantitative: stages.clone(),
            sleep: stages.clone(),
            continuity: stages.clone(),
            thematic: stages,
        }
    }
}

impl std::fmt::Debug for StageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSet").finish_non_exhaustive()
    }
}
