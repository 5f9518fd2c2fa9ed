//! Sleep, plausibility, continuity and theme facets

use serde::{Deserialize, Serialize};

// ============================================================================
// SLEEP
// ============================================================================

/// Estimated sleep stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SleepStageKind {
    #[serde(rename = "REM")]
    Rem,
    #[serde(rename = "NREM")]
    Nrem,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl std::fmt::Display for SleepStageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepStageKind::Rem => write!(f, "REM"),
            SleepStageKind::Nrem => write!(f, "NREM"),
            SleepStageKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for SleepStageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rem" => Ok(SleepStageKind::Rem),
            "nrem" | "non-rem" => Ok(SleepStageKind::Nrem),
            "unknown" | "" => Ok(SleepStageKind::Unknown),
            _ => Err(format!("Unknown sleep stage: {}", s)),
        }
    }
}

/// Sleep-stage facet. `prob` is present exactly when the stage is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SleepStage {
    pub stage: SleepStageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob: Option<f64>,
    pub confidence: f64,
    pub vividness: f64,
    pub emotional_intensity: f64,
    pub bizarreness_score: f64,
    pub narrative_coherence: f64,
}

impl SleepStage {
    pub fn is_known(&self) -> bool {
        self.stage != SleepStageKind::Unknown
    }
}

// ============================================================================
// PLAUSIBILITY
// ============================================================================

/// Realism of the dream. `overall` is always recomputed from the other four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Plausibility {
    pub logical: f64,
    pub physical: f64,
    pub social: f64,
    pub bizarreness: f64,
    pub overall: f64,
}

impl Plausibility {
    /// Mean realism of the three axes, penalized by `weight * bizarreness`
    pub fn weighted_overall(&self, bizarreness_weight: f64) -> f64 {
        let mean = (self.logical + self.physical + self.social) / 3.0;
        (mean * (1.0 - bizarreness_weight * self.bizarreness / 100.0)).round()
    }
}

// ============================================================================
// CONTINUITY
// ============================================================================

/// Continuity with waking life
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Continuity {
    pub thematic: f64,
    pub overall: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive: Option<f64>,
    pub has_day_data: bool,
}

// ============================================================================
// THEMES
// ============================================================================

/// Coarse three-step grade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::Medium => write!(f, "medium"),
            Level::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" | "moderate" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            _ => Err(format!("Unknown level: {}", s)),
        }
    }
}

/// One detected theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThemeIndex {
    pub id: String,
    /// Display label from the thematic adapter, possibly translated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Stage-native scale
    pub score_raw: f64,
    /// 0-100, set by Normalize when at least one theme scored above zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_norm: Option<f64>,
    pub evidence_spans: Vec<String>,
    pub strength: Level,
    pub evidence_level: Level,
}
