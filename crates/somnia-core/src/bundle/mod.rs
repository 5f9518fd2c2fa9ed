//! Bundle module - the canonical analysis record
//!
//! One [`AnalysisBundle`] is built per request. It passes through
//! Merge, Normalize, Validate, Derive and Heal, each consuming the
//! previous stage's complete output, and is returned to the caller.

mod emotion;
mod entities;
mod facets;

pub use emotion::{
    EmotionIndex, EmotionLabel, Tone, Valence, determine_tone, determine_tone_with_threshold,
};
pub use entities::{EntityCategory, EntityIndex};
pub use facets::{Continuity, Level, Plausibility, SleepStage, SleepStageKind, ThemeIndex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// LANGUAGE
// ============================================================================

/// Supported narrative languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Tr];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "tr" | "turkish" | "türkçe" => Ok(Language::Tr),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

// ============================================================================
// BUNDLE
// ============================================================================

/// Signals computed straight from the source text during Derive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextSignals {
    pub has_dialogue: bool,
    pub has_emotional_content: bool,
    /// Independent text-pattern bizarreness score (0-100)
    pub text_bizarreness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub analysis_version: String,
    pub timestamp: DateTime<Utc>,
    /// Overall confidence, 0-100
    pub confidence: f64,
}

/// The canonical, validated analysis result for one dream text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBundle {
    pub emotions: EmotionIndex,
    pub entities: EntityIndex,
    pub sleep: SleepStage,
    pub plausibility: Plausibility,
    pub continuity: Continuity,
    pub themes: Vec<ThemeIndex>,
    pub source_text: String,
    pub language: Language,
    pub hide_emotion_cards: bool,
    pub hide_sleep_percentages: bool,
    pub hide_continuity_data: bool,
    pub has_metamorphosis: bool,
    pub signals: TextSignals,
    pub metadata: BundleMetadata,
}

/// Outcome of one consistency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Stable rule identifier
    pub rule: String,
    pub passed: bool,
    pub message: String,
    pub original_value: serde_json::Value,
    pub corrected_value: serde_json::Value,
}
