//! Emotion index and the tone function

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TONE_THRESHOLD;

/// Dominant valence label derived from the pos/neg/neu triad
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Positive => write!(f, "positive"),
            Tone::Negative => write!(f, "negative"),
            Tone::Neutral => write!(f, "neutral"),
        }
    }
}

/// Valence class of a single emotion label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Valence {
    Pos,
    Neg,
    #[default]
    Neu,
}

impl std::str::FromStr for Valence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pos" | "positive" => Ok(Valence::Pos),
            "neg" | "negative" => Ok(Valence::Neg),
            "neu" | "neutral" => Ok(Valence::Neu),
            _ => Err(format!("Unknown valence: {}", s)),
        }
    }
}

/// One detected emotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmotionLabel {
    pub tag: String,
    pub score: f64,
    pub intensity: f64,
    pub valence: Valence,
    pub arousal: f64,
}

/// Emotion facet of the bundle.
///
/// `tone` is derived from `pos/neg/neu`; it is never set on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionIndex {
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
    /// Primary (highest-intensity) emotion first
    pub labels: Vec<EmotionLabel>,
    /// 0-100
    pub confidence: f64,
    pub tone: Tone,
}

impl Default for EmotionIndex {
    fn default() -> Self {
        Self {
            pos: 0.0,
            neg: 0.0,
            neu: 100.0,
            labels: Vec::new(),
            confidence: 0.0,
            tone: Tone::Neutral,
        }
    }
}

impl EmotionIndex {
    /// Sum of the valence triad
    pub fn valence_total(&self) -> f64 {
        self.pos + self.neg + self.neu
    }

    /// Tone the triad implies under `threshold`
    pub fn computed_tone(&self, threshold: f64) -> Tone {
        determine_tone_with_threshold(self.pos, self.neg, self.neu, threshold)
    }

    pub fn primary(&self) -> Option<&EmotionLabel> {
        self.labels.first()
    }
}

/// Tone of a pos/neg/neu triad at the default 60% threshold
pub fn determine_tone(pos: f64, neg: f64, neu: f64) -> Tone {
    determine_tone_with_threshold(pos, neg, neu, DEFAULT_TONE_THRESHOLD)
}

/// Tone of a triad: neutral unless one share reaches `threshold`;
/// ties resolve negative before positive.
pub fn determine_tone_with_threshold(pos: f64, neg: f64, neu: f64, threshold: f64) -> Tone {
    let max = pos.max(neg).max(neu);
    if max < threshold {
        Tone::Neutral
    } else if max == neg {
        Tone::Negative
    } else if max == pos {
        Tone::Positive
    } else {
        Tone::Neutral
    }
}
