//! Stage invocation
//!
//! Emotion runs first because quantitative extraction consumes its
//! result. The other four adapters then run concurrently on the calling
//! task and are joined before Merge. The first failure wins; dropping the
//! join drops every adapter still in flight.

use std::time::Instant;

use crate::bundle::Language;
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result, StageError};
use crate::stages::{
    DemographicsHint, QuantitativeRequest, RawAnalysisResults, SleepHints, StageKind, StageSet,
    Translate,
};

fn adapter_failure(stage: StageKind, source: StageError) -> AnalysisError {
    tracing::warn!(stage = %stage, error = %source, "Stage adapter failed");
    AnalysisError::adapter(stage, source)
}

/// Run the five adapters and collect their raw results
pub async fn invoke_stages(
    stages: &StageSet,
    text: &str,
    language: Language,
    demographics: Option<&DemographicsHint>,
    translate: Option<&dyn Translate>,
    config: &PipelineConfig,
) -> Result<RawAnalysisResults> {
    let start = Instant::now();

    let emotion = stages
        .emotion
        .score(text, language)
        .await
        .map_err(|e| adapter_failure(StageKind::Emotion, e))?;
    tracing::debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        labels = emotion.secondary.len() + usize::from(emotion.primary.is_some()),
        "Emotion stage complete"
    );

    let request = QuantitativeRequest {
        demographics,
        emotion_hint: &emotion,
        model_version: &config.model_version,
        settings: &config.extraction,
    };
    let hints = SleepHints {
        bedtime: demographics.and_then(|d| d.bedtime),
        emotion_intensity: emotion.primary.as_ref().map(|l| l.intensity),
    };

    let (quantitative, sleep, continuity, thematic) = tokio::try_join!(
        async {
            stages
                .quantitative
                .extract(text, language, request)
                .await
                .map_err(|e| adapter_failure(StageKind::Quantitative, e))
        },
        async {
            stages
                .sleep
                .estimate(text, hints, language)
                .await
                .map_err(|e| adapter_failure(StageKind::Sleep, e))
        },
        async {
            stages
                .continuity
                .score(text, demographics, language)
                .await
                .map_err(|e| adapter_failure(StageKind::Continuity, e))
        },
        async {
            stages
                .thematic
                .extract(text, language, translate)
                .await
                .map_err(|e| adapter_failure(StageKind::Thematic, e))
        },
    )?;

    tracing::debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        quantitative = quantitative.is_some(),
        themes = thematic.themes.len(),
        "All stage adapters complete"
    );

    Ok(RawAnalysisResults {
        emotion,
        quantitative,
        sleep,
        continuity,
        thematic,
    })
}
