//! Test Data Factory
//!
//! Dream narratives and raw stage results for pipeline scenarios:
//! - Curated narratives in both supported languages
//! - Raw results that agree with each other
//! - Raw results with the contradictions Validate must correct

use somnia_core::stages::{
    CharacterRaw, CircadianRaw, ContinuityRaw, EmotionRaw, QuantitativeRaw, RealityTesting,
    SleepRaw, ThematicRaw, ThemeRaw, ValenceTriad,
};
use somnia_core::{EmotionLabel, Level, RawAnalysisResults, Valence};

/// Dream narratives
pub mod dreams {
    /// Contains the curated "melted into nothing" transformation
    pub const MELTED: &str = "I was standing in my grandmother's kitchen and she looked at me, \
                              then slowly melted into nothing while the clock kept ticking.";

    /// Turkish narrative with a bird transformation and family members
    pub const TURKISH: &str = "Annem ve babam bahçedeydi. Annem bir anda kuşa dönüştü ve \
                               uçup gitti, çok korktum.";

    /// Everyday content, nothing impossible
    pub const MUNDANE: &str = "I was at the office preparing for a meeting with my boss \
                               and a friend brought me coffee.";

    /// Flying, a talking animal and a late relative
    pub const BIZARRE: &str = "Suddenly I was flying over the sea and a dog said my name. \
                               My late grandfather was waiting at the airport.";
}

/// Factory for raw stage results
pub struct RawResultsFactory;

impl RawResultsFactory {
    pub fn label(tag: &str, intensity: f64, valence: Valence) -> EmotionLabel {
        EmotionLabel {
            tag: tag.to_string(),
            score: 50.0,
            intensity,
            valence,
            arousal: intensity / 100.0,
        }
    }

    pub fn emotion(pos: f64, neg: f64, neu: f64, labels: Vec<EmotionLabel>) -> EmotionRaw {
        let mut labels = labels.into_iter();
        EmotionRaw {
            primary: labels.next(),
            secondary: labels.collect(),
            valence: Some(ValenceTriad { pos, neg, neu }),
            confidence: Some(70.0),
        }
    }

    pub fn reality(logical: f64, physical: f64, social: f64, overall: f64) -> ContinuityRaw {
        ContinuityRaw {
            overall: Some(40.0),
            thematic: Some(30.0),
            emotional: None,
            social: None,
            cognitive: None,
            reality_testing: Some(RealityTesting {
                logical_consistency: Some(logical),
                physical_plausibility: Some(physical),
                social_realism: Some(social),
                overall_realism: Some(overall),
            }),
        }
    }

    pub fn characters(names: &[&str]) -> QuantitativeRaw {
        QuantitativeRaw {
            characters: names
                .iter()
                .map(|name| CharacterRaw {
                    name: name.to_string(),
                    kind: None,
                })
                .collect(),
            setting: None,
            confidence: Some(60.0),
            model_version: Some("fixture".to_string()),
        }
    }

    pub fn theme(id: &str, confidence: f64) -> ThemeRaw {
        ThemeRaw {
            id: id.to_string(),
            label: None,
            confidence: Some(confidence),
            evidence: vec![id.to_string()],
            strength: Some(Level::Medium),
            evidence_level: Some(Level::Low),
        }
    }

    /// Negative dream whose facets already agree
    pub fn nightmare() -> RawAnalysisResults {
        RawAnalysisResults {
            emotion: Self::emotion(
                5.0,
                85.0,
                10.0,
                vec![
                    Self::label("fear", 90.0, Valence::Neg),
                    Self::label("sadness", 40.0, Valence::Neg),
                ],
            ),
            quantitative: Some(Self::characters(&["grandmother"])),
            sleep: SleepRaw {
                stage: Some("REM".to_string()),
                confidence: Some(60.0),
                vividness: Some(80.0),
                emotional_intensity: Some(90.0),
                bizarreness: Some(50.0),
                narrative_coherence: Some(40.0),
                circadian: Some(CircadianRaw { rem_probability: 0.7 }),
            },
            continuity: Self::reality(60.0, 90.0, 80.0, 70.0),
            thematic: ThematicRaw {
                themes: vec![Self::theme("death", 0.6), Self::theme("family", 0.3)],
            },
        }
    }

    /// Facets that contradict each other in every validated way
    pub fn contradictory() -> RawAnalysisResults {
        RawAnalysisResults {
            // Raw scale: neutral at merge time, negative once normalized
            emotion: Self::emotion(0.1, 0.85, 0.05, vec![]),
            quantitative: Some(Self::characters(&["anne", "anne", "baba"])),
            sleep: SleepRaw {
                stage: Some("unknown".to_string()),
                confidence: Some(30.0),
                circadian: Some(CircadianRaw { rem_probability: 0.42 }),
                ..Default::default()
            },
            continuity: Self::reality(80.0, 95.0, 85.0, 95.0),
            thematic: ThematicRaw {
                themes: vec![Self::theme("water", 0.0), Self::theme("lost", 0.0)],
            },
        }
    }
}
