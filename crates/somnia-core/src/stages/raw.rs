//! Raw stage results
//!
//! Shapes returned by the five stage adapters, before Merge projects them
//! into the bundle. Every field an adapter may leave out is optional;
//! Merge supplies the stage-appropriate zero value.

use serde::{Deserialize, Serialize};

use crate::bundle::{EmotionLabel, Level};

/// Valence triad as reported by the emotion adapter (any positive scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValenceTriad {
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EmotionRaw {
    pub primary: Option<EmotionLabel>,
    pub secondary: Vec<EmotionLabel>,
    pub valence: Option<ValenceTriad>,
    /// 0-100
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterRaw {
    /// Surface string as it appeared in the narrative
    pub name: String,
    /// Adapter-supplied type hint, e.g. "animal", "dog", "family"
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QuantitativeRaw {
    pub characters: Vec<CharacterRaw>,
    /// Single setting description
    pub setting: Option<String>,
    /// 0-100
    pub confidence: Option<f64>,
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CircadianRaw {
    /// 0-1
    pub rem_probability: f64,
}

/// Sleep-stage estimate. Numeric fields are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SleepRaw {
    pub stage: Option<String>,
    pub confidence: Option<f64>,
    pub vividness: Option<f64>,
    pub emotional_intensity: Option<f64>,
    pub bizarreness: Option<f64>,
    pub narrative_coherence: Option<f64>,
    pub circadian: Option<CircadianRaw>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RealityTesting {
    pub logical_consistency: Option<f64>,
    pub physical_plausibility: Option<f64>,
    pub social_realism: Option<f64>,
    pub overall_realism: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContinuityRaw {
    pub overall: Option<f64>,
    pub thematic: Option<f64>,
    pub emotional: Option<f64>,
    pub social: Option<f64>,
    pub cognitive: Option<f64>,
    pub reality_testing: Option<RealityTesting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeRaw {
    pub id: String,
    /// Display label, possibly translated
    pub label: Option<String>,
    /// Stage-native scale
    pub confidence: Option<f64>,
    pub evidence: Vec<String>,
    pub strength: Option<Level>,
    pub evidence_level: Option<Level>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ThematicRaw {
    pub themes: Vec<ThemeRaw>,
}

/// Untouched per-stage results, returned next to the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisResults {
    pub emotion: EmotionRaw,
    pub quantitative: Option<QuantitativeRaw>,
    pub sleep: SleepRaw,
    pub continuity: ContinuityRaw,
    pub thematic: ThematicRaw,
}
