//! Heuristic stage adapters
//!
//! Lexicon-backed implementations of all five adapter contracts, so the
//! pipeline runs end-to-end without external services. Scoring follows
//! the valence/arousal circumplex:
//!
//! - emotion words carry (valence, arousal); a negation in the three
//!   preceding words flips and dampens valence
//! - bizarreness comes from the curated pattern tables
//! - REM likelihood grows with bizarreness, emotional intensity and length
//!
//! These are reference scorers. Production deployments are expected to
//! plug in their own adapters through [`super::StageSet`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use super::{
    CharacterRaw, CircadianRaw, ContinuityRaw, ContinuityStage, DemographicsHint, EmotionRaw,
    EmotionStage, QuantitativeRaw, QuantitativeRequest, QuantitativeStage, RealityTesting,
    SleepHints, SleepRaw, SleepStageEstimator, StageResult, ThematicRaw, ThematicStage,
    ThemeRaw, Translate, ValenceTriad,
};
use crate::bundle::{EmotionLabel, EntityCategory, Language, Level, Valence};
use crate::detect::Lexicon;

/// Valence multiplier for a negated emotion word
const NEGATION_DAMPING: f64 = 0.7;

/// Words before an emotion word searched for a negation
const NEGATION_WINDOW: usize = 3;

/// Raw theme weight per keyword hit (stage-native scale)
const THEME_HIT_WEIGHT: f64 = 0.25;

/// REM score bounds for a confident stage call
const REM_THRESHOLD: f64 = 55.0;
const NREM_THRESHOLD: f64 = 25.0;

/// Lexicon-backed adapters for every stage
#[derive(Debug, Clone)]
pub struct HeuristicStages {
    lexicon: Arc<Lexicon>,
}

#[derive(Debug, Default)]
struct TagAccumulator {
    hits: usize,
    valence: f64,
    arousal: f64,
}

impl HeuristicStages {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Evaluate emotion words with a negation window
    fn evaluate_emotions(&self, text: &str) -> EmotionRaw {
        let words = Lexicon::tokenize(text);
        let mut tags: HashMap<&'static str, TagAccumulator> = HashMap::new();
        let mut order: Vec<&'static str> = Vec::new();
        let (mut pos, mut neg, mut neu) = (0.0, 0.0, 1.0);
        let mut hit_count = 0;

        for (i, word) in words.iter().enumerate() {
            let Some(entry) = self.lexicon.lookup_emotion(word) else {
                continue;
            };
            let negated = (i.saturating_sub(NEGATION_WINDOW)..i)
                .any(|j| self.lexicon.is_negation(&words[j]));
            let valence = if negated {
                -entry.valence * NEGATION_DAMPING
            } else {
                entry.valence
            };

            pos += valence.max(0.0);
            neg += (-valence).max(0.0);
            neu += (1.0 - valence.abs()) * 0.5;
            hit_count += 1;

            if !tags.contains_key(entry.tag) {
                order.push(entry.tag);
            }
            let acc = tags.entry(entry.tag).or_default();
            acc.hits += 1;
            acc.valence += valence;
            acc.arousal += entry.arousal;
        }

        let mut labels: Vec<EmotionLabel> = order
            .iter()
            .map(|tag| {
                let acc = &tags[tag];
                let n = acc.hits as f64;
                let mean_valence = acc.valence / n;
                let mean_arousal = acc.arousal / n;
                EmotionLabel {
                    tag: tag.to_string(),
                    score: (n / hit_count as f64 * 100.0).round(),
                    intensity: (mean_arousal * 100.0 * (1.0 + 0.1 * (n - 1.0))).min(100.0).round(),
                    valence: if mean_valence > 0.2 {
                        Valence::Pos
                    } else if mean_valence < -0.2 {
                        Valence::Neg
                    } else {
                        Valence::Neu
                    },
                    arousal: mean_arousal,
                }
            })
            .collect();
        labels.sort_by(|a, b| {
            b.intensity
                .partial_cmp(&a.intensity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let confidence = if words.is_empty() {
            0.0
        } else {
            let coverage = (hit_count as f64 / words.len() as f64 * 5.0).min(1.0);
            (coverage * 60.0
                + if hit_count > 3 { 20.0 } else { 0.0 }
                + if labels.len() > 1 { 10.0 } else { 0.0 })
            .round()
        };

        let mut labels = labels.into_iter();
        EmotionRaw {
            primary: labels.next(),
            secondary: labels.collect(),
            valence: Some(ValenceTriad { pos, neg, neu }),
            confidence: Some(confidence),
        }
    }

    /// Tokens matching any single-word keyword count once; phrases by occurrence
    fn theme_hits(words: &[String], lower: &str, keywords: &[&'static str]) -> (usize, Vec<String>) {
        let (phrases, singles): (Vec<&str>, Vec<&str>) =
            keywords.iter().copied().partition(|k| k.contains(' '));

        let mut hits = words
            .iter()
            .filter(|w| singles.iter().any(|k| token_matches(w, k)))
            .count();
        let mut evidence: Vec<String> = singles
            .iter()
            .filter(|k| words.iter().any(|w| token_matches(w, k)))
            .map(|k| k.to_string())
            .collect();
        for phrase in phrases {
            let n = lower.matches(phrase).count();
            if n > 0 {
                hits += n;
                evidence.push(phrase.to_string());
            }
        }
        (hits, evidence)
    }
}

fn token_matches(word: &str, keyword: &str) -> bool {
    word == keyword || (keyword.chars().count() >= 4 && word.starts_with(keyword))
}

#[async_trait]
impl EmotionStage for HeuristicStages {
    async fn score(&self, text: &str, _language: Language) -> StageResult<EmotionRaw> {
        Ok(self.evaluate_emotions(text))
    }
}

#[async_trait]
impl QuantitativeStage for HeuristicStages {
    async fn extract(
        &self,
        text: &str,
        _language: Language,
        request: QuantitativeRequest<'_>,
    ) -> StageResult<Option<QuantitativeRaw>> {
        let words = Lexicon::tokenize(text);
        if words.len() < request.settings.min_words {
            return Ok(None);
        }
        if request.settings.use_model {
            tracing::debug!("Model-assisted extraction unavailable, using keyword extraction");
        }

        let mut characters = Vec::new();
        let mut setting = None;
        for word in &words {
            match self.lexicon.lookup_entity(word) {
                Some((keyword, EntityCategory::People | EntityCategory::Animals)) => {
                    characters.push(CharacterRaw {
                        name: keyword.to_string(),
                        kind: None,
                    });
                }
                Some((keyword, EntityCategory::Places)) if setting.is_none() => {
                    setting = Some(keyword.to_string());
                }
                _ => {}
            }
        }
        characters.truncate(request.settings.max_characters);

        // Emotional narratives tend to name their characters more reliably
        let emotion_boost = request.emotion_hint.confidence.unwrap_or(0.0) * 0.1;
        let confidence = (40.0 + 5.0 * characters.len() as f64 + emotion_boost).min(90.0).round();

        Ok(Some(QuantitativeRaw {
            characters,
            setting,
            confidence: Some(confidence),
            model_version: Some(request.model_version.to_string()),
        }))
    }
}

#[async_trait]
impl SleepStageEstimator for HeuristicStages {
    async fn estimate(
        &self,
        text: &str,
        hints: SleepHints,
        _language: Language,
    ) -> StageResult<SleepRaw> {
        let word_count = Lexicon::tokenize(text).len() as f64;
        let bizarreness = self.lexicon.text_bizarreness(text);
        let intensity = hints.emotion_intensity.unwrap_or(0.0).clamp(0.0, 100.0);

        let rem_score = 0.5 * bizarreness + 0.3 * intensity + 0.2 * word_count.min(100.0);
        let stage = if rem_score >= REM_THRESHOLD {
            Some("REM")
        } else if rem_score <= NREM_THRESHOLD {
            Some("NREM")
        } else {
            None
        };

        // Later in the night REM dominates; a known bedtime sharpens the estimate
        let circadian = stage.map(|_| {
            let base = (rem_score / 100.0).clamp(0.05, 0.95);
            let rem_probability = if hints.bedtime.is_some() {
                (base * 0.8 + 0.15).min(0.95)
            } else {
                base
            };
            CircadianRaw { rem_probability }
        });

        Ok(SleepRaw {
            stage: Some(stage.unwrap_or("unknown").to_string()),
            confidence: Some(((rem_score - 40.0).abs() * 1.5).clamp(0.0, 100.0).round()),
            vividness: Some((40.0 + 0.4 * intensity + 0.2 * bizarreness).min(100.0).round()),
            emotional_intensity: Some(intensity),
            bizarreness: Some(bizarreness),
            narrative_coherence: Some((100.0 - 0.6 * bizarreness).round()),
            circadian,
        })
    }
}

#[async_trait]
impl ContinuityStage for HeuristicStages {
    async fn score(
        &self,
        text: &str,
        _demographics: Option<&DemographicsHint>,
        _language: Language,
    ) -> StageResult<ContinuityRaw> {
        let bizarreness = self.lexicon.text_bizarreness(text);
        let everyday_hits = Lexicon::tokenize(text)
            .iter()
            .filter(|w| {
                matches!(
                    self.lexicon.lookup_entity(w),
                    Some((_, EntityCategory::People | EntityCategory::Places | EntityCategory::Objects | EntityCategory::Events))
                )
            })
            .count();

        let logical = (100.0 - 0.6 * bizarreness).round();
        let physical = (100.0 - 0.8 * bizarreness).round();
        let social = (100.0 - 0.4 * bizarreness).round();
        let overall_realism = ((logical + physical + social) / 3.0).round();
        let thematic = (everyday_hits as f64 * 8.0).min(100.0);

        Ok(ContinuityRaw {
            overall: Some((thematic * 0.6 + overall_realism * 0.4).round()),
            thematic: Some(thematic),
            emotional: None,
            social: None,
            cognitive: None,
            reality_testing: Some(RealityTesting {
                logical_consistency: Some(logical),
                physical_plausibility: Some(physical),
                social_realism: Some(social),
                overall_realism: Some(overall_realism),
            }),
        })
    }
}

#[async_trait]
impl ThematicStage for HeuristicStages {
    async fn extract(
        &self,
        text: &str,
        _language: Language,
        translate: Option<&dyn Translate>,
    ) -> StageResult<ThematicRaw> {
        let lower = text.to_lowercase();
        let words = Lexicon::tokenize(text);

        let mut themes: Vec<(usize, ThemeRaw)> = Vec::new();
        for theme in self.lexicon.themes() {
            let (hits, evidence) = Self::theme_hits(&words, &lower, &theme.keywords);
            if hits == 0 {
                continue;
            }

            let label = translate.map(|t| {
                let mut vars = BTreeMap::new();
                vars.insert("count".to_string(), hits.to_string());
                t.translate(&format!("theme.{}", theme.id), Some(&vars))
            });
            let strength = match hits {
                0..=1 => Level::Low,
                2 => Level::Medium,
                _ => Level::High,
            };
            let evidence_level = match evidence.len() {
                0..=1 => Level::Low,
                2 => Level::Medium,
                _ => Level::High,
            };

            themes.push((
                hits,
                ThemeRaw {
                    id: theme.id.to_string(),
                    label,
                    confidence: Some(hits as f64 * THEME_HIT_WEIGHT),
                    evidence,
                    strength: Some(strength),
                    evidence_level: Some(evidence_level),
                },
            ));
        }
        themes.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(ThematicRaw {
            themes: themes.into_iter().map(|(_, t)| t).collect(),
        })
    }
}
