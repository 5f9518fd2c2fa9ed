//! Merge - project raw stage results into the bundle shape
//!
//! Renames fields, converts units and fills stage-appropriate zero values.
//! Nothing here deduplicates or corrects; contradictions between facets
//! are left for Validate to find.

use chrono::Utc;

use crate::bundle::{
    AnalysisBundle, BundleMetadata, Continuity, EmotionIndex, EntityCategory, EntityIndex,
    Language, Plausibility, SleepStage, SleepStageKind, ThemeIndex, determine_tone_with_threshold,
};
use crate::config::PipelineConfig;
use crate::detect::Lexicon;
use crate::stages::{
    CharacterRaw, ContinuityRaw, EmotionRaw, QuantitativeRaw, RawAnalysisResults, SleepRaw,
    ThematicRaw,
};

/// Build the initial bundle from the five raw results
pub fn merge(
    raw: &RawAnalysisResults,
    source_text: &str,
    language: Language,
    lexicon: &Lexicon,
    config: &PipelineConfig,
) -> AnalysisBundle {
    AnalysisBundle {
        emotions: merge_emotions(&raw.emotion, config.tone_threshold),
        entities: merge_entities(raw.quantitative.as_ref(), lexicon),
        sleep: merge_sleep(&raw.sleep),
        plausibility: merge_plausibility(&raw.continuity),
        continuity: merge_continuity(&raw.continuity),
        themes: merge_themes(&raw.thematic),
        source_text: source_text.to_string(),
        language,
        metadata: BundleMetadata {
            analysis_version: config.analysis_version.clone(),
            timestamp: Utc::now(),
            confidence: overall_confidence(raw),
        },
        ..Default::default()
    }
}

fn merge_emotions(raw: &EmotionRaw, tone_threshold: f64) -> EmotionIndex {
    let (pos, neg, neu) = match raw.valence {
        Some(v) => (v.pos, v.neg, v.neu),
        None => (0.0, 0.0, 100.0),
    };

    let labels = raw
        .primary
        .iter()
        .chain(raw.secondary.iter())
        .cloned()
        .collect();

    EmotionIndex {
        pos,
        neg,
        neu,
        labels,
        confidence: raw.confidence.unwrap_or(0.0),
        tone: determine_tone_with_threshold(pos, neg, neu, tone_threshold),
    }
}

fn merge_entities(raw: Option<&QuantitativeRaw>, lexicon: &Lexicon) -> EntityIndex {
    let mut entities = EntityIndex::new();
    let Some(raw) = raw else {
        return entities;
    };

    for character in &raw.characters {
        let name = character.name.trim();
        if name.is_empty() {
            continue;
        }
        let category = if is_animal(character, lexicon) {
            EntityCategory::Animals
        } else {
            EntityCategory::People
        };
        // Raw push: repeats survive until Validate
        entities.category_mut(category).push(name.to_string());
    }

    if let Some(setting) = raw.setting.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        entities.places.push(setting.to_string());
    }
    entities
}

/// Animal if the type hint or any word of the name is an animal token
fn is_animal(character: &CharacterRaw, lexicon: &Lexicon) -> bool {
    let hinted = character
        .kind
        .as_deref()
        .map(|kind| Lexicon::tokenize(kind).iter().any(|t| lexicon.is_animal_token(t)))
        .unwrap_or(false);
    hinted
        || Lexicon::tokenize(&character.name)
            .iter()
            .any(|t| lexicon.is_animal_token(t))
}

fn merge_sleep(raw: &SleepRaw) -> SleepStage {
    let stage = raw
        .stage
        .as_deref()
        .and_then(|s| s.parse::<SleepStageKind>().ok())
        .unwrap_or_default();

    SleepStage {
        stage,
        prob: raw.circadian.map(|c| (c.rem_probability * 100.0).round()),
        confidence: raw.confidence.unwrap_or(0.0),
        vividness: raw.vividness.unwrap_or(0.0),
        emotional_intensity: raw.emotional_intensity.unwrap_or(0.0),
        bizarreness_score: raw.bizarreness.unwrap_or(0.0),
        narrative_coherence: raw.narrative_coherence.unwrap_or(0.0),
    }
}

fn merge_plausibility(raw: &ContinuityRaw) -> Plausibility {
    let Some(reality) = raw.reality_testing.as_ref() else {
        return Plausibility::default();
    };
    Plausibility {
        logical: reality.logical_consistency.unwrap_or(0.0),
        physical: reality.physical_plausibility.unwrap_or(0.0),
        social: reality.social_realism.unwrap_or(0.0),
        bizarreness: reality.overall_realism.map(|r| 100.0 - r).unwrap_or(0.0),
        // Provisional; Validate and Derive recompute it
        overall: reality.overall_realism.unwrap_or(0.0),
    }
}

fn merge_continuity(raw: &ContinuityRaw) -> Continuity {
    Continuity {
        thematic: raw.thematic.unwrap_or(0.0),
        overall: raw.overall.unwrap_or(0.0),
        emotional: raw.emotional,
        social: raw.social,
        cognitive: raw.cognitive,
        has_day_data: false,
    }
}

fn merge_themes(raw: &ThematicRaw) -> Vec<ThemeIndex> {
    raw.themes
        .iter()
        .map(|theme| ThemeIndex {
            id: theme.id.clone(),
            label: theme.label.clone(),
            score_raw: theme.confidence.unwrap_or(0.0),
            score_norm: None,
            evidence_spans: theme.evidence.clone(),
            strength: theme.strength.unwrap_or_default(),
            evidence_level: theme.evidence_level.unwrap_or_default(),
        })
        .collect()
}

/// Mean of the emotion and sleep confidences, plus the quantitative one
/// when that adapter produced a result
fn overall_confidence(raw: &RawAnalysisResults) -> f64 {
    let mut scores = vec![
        raw.emotion.confidence.unwrap_or(0.0),
        raw.sleep.confidence.unwrap_or(0.0),
    ];
    if let Some(q) = &raw.quantitative {
        scores.push(q.confidence.unwrap_or(0.0));
    }
    (scores.iter().sum::<f64>() / scores.len() as f64).round()
}
