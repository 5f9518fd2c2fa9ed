//! Pipeline scenario tests
//!
//! Whole requests through the orchestrator, checking the bundle that
//! comes out against the consistency rules.

use std::collections::BTreeMap;
use std::sync::Arc;

use somnia_core::{
    Language, Orchestrator, PipelineConfig, PipelineStage, SleepStageKind, Tone, determine_tone,
};
use somnia_e2e_tests::harness::RecordingStages;
use somnia_e2e_tests::mocks::{RawResultsFactory, dreams};

fn scripted(results: somnia_core::RawAnalysisResults) -> (Arc<RecordingStages>, Orchestrator) {
    let stages = Arc::new(RecordingStages::new(results));
    let orchestrator = Orchestrator::new(stages.stage_set(), PipelineConfig::default()).unwrap();
    (stages, orchestrator)
}

#[tokio::test(start_paused = true)]
async fn test_melted_into_nothing_caps_physical_plausibility() {
    let (_, orchestrator) = scripted(RawResultsFactory::nightmare());
    let result = orchestrator
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap();
    let p = &result.bundle.plausibility;

    assert!(result.bundle.has_metamorphosis);
    // The continuity adapter reported physical = 90
    assert_eq!(result.raw_results.continuity.reality_testing.unwrap().physical_plausibility, Some(90.0));
    assert_eq!(p.physical, 50.0);
    assert_eq!(p.bizarreness, 30.0);
    let expected = ((p.logical + p.physical + p.social) / 3.0 * (1.0 - 0.5 * p.bizarreness / 100.0)).round();
    assert_eq!(p.overall, expected);
}

#[tokio::test]
async fn test_melted_into_nothing_with_heuristic_stages() {
    let orchestrator = Orchestrator::heuristic(PipelineConfig::default()).unwrap();
    let result = orchestrator
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap();
    assert!(result.bundle.has_metamorphosis);
    assert!(result.bundle.plausibility.physical <= 50.0);
}

#[tokio::test(start_paused = true)]
async fn test_contradictions_are_corrected() {
    let (_, orchestrator) = scripted(RawResultsFactory::contradictory());
    let result = orchestrator
        .orchestrate(dreams::MUNDANE, Language::En, None, None)
        .await
        .unwrap();
    let bundle = &result.bundle;

    // Tone follows the normalized triad
    let e = &bundle.emotions;
    assert_eq!(e.tone, Tone::Negative);
    assert_eq!(e.tone, determine_tone(e.pos, e.neg, e.neu));
    let rounded = e.pos.round() + e.neg.round() + e.neu.round();
    assert!((rounded - 100.0).abs() <= 1.0);

    // Unknown stage carries no probability
    assert_eq!(bundle.sleep.stage, SleepStageKind::Unknown);
    assert!(bundle.sleep.prob.is_none());
    assert!(bundle.hide_sleep_percentages);

    // Duplicates removed, keyword entities merged in as a set
    assert_eq!(&bundle.entities.people[..2], &["anne".to_string(), "baba".to_string()]);
    assert!(bundle.entities.people.contains(&"boss".to_string()));
    assert!(!bundle.entities.has_duplicates());

    // All-zero themes get no normalized score
    assert!(bundle.themes.iter().all(|t| t.score_norm.is_none()));

    // Overall realism follows the weighted formula
    let expected = ((80.0 + 95.0 + 85.0) / 3.0 * (1.0 - 0.5 * 5.0 / 100.0_f64)).round();
    assert_eq!(bundle.plausibility.overall, expected);

    let rules: Vec<&str> = result.violations.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec![
            "tone_consistency",
            "neutral_tone_strong_valence",
            "realism_consistency",
            "sleep_probability",
            "entity_duplicates"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_heal_flags_follow_final_state() {
    let (_, orchestrator) = scripted(RawResultsFactory::nightmare());
    let bundle = orchestrator
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap()
        .bundle;
    assert_eq!(bundle.sleep.stage, SleepStageKind::Rem);
    assert_eq!(bundle.sleep.prob, Some(70.0));
    assert!(!bundle.hide_sleep_percentages);
    assert!(!bundle.hide_emotion_cards);

    let (_, orchestrator) = scripted(RawResultsFactory::contradictory());
    let bundle = orchestrator
        .orchestrate(dreams::MUNDANE, Language::En, None, None)
        .await
        .unwrap()
        .bundle;
    assert!(bundle.emotions.labels.is_empty());
    assert!(bundle.hide_emotion_cards);
}

#[tokio::test(start_paused = true)]
async fn test_has_day_data_is_currently_always_false() {
    let (_, orchestrator) = scripted(RawResultsFactory::nightmare());
    let bundle = orchestrator
        .orchestrate(dreams::MUNDANE, Language::En, None, None)
        .await
        .unwrap()
        .bundle;
    assert!(!bundle.continuity.has_day_data);
    assert!(bundle.hide_continuity_data);
}

#[tokio::test(start_paused = true)]
async fn test_raw_results_returned_untouched() {
    let (_, orchestrator) = scripted(RawResultsFactory::nightmare());
    let result = orchestrator
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap();
    assert_eq!(result.raw_results, RawResultsFactory::nightmare());
    // mean(emotion 70, sleep 60, quantitative 60)
    assert_eq!(result.bundle.metadata.confidence, 63.0);

    let stages: Vec<PipelineStage> = result.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages.len(), 5);
    assert_eq!(stages.first(), Some(&PipelineStage::Merge));
    assert_eq!(stages.last(), Some(&PipelineStage::Heal));
    assert!(result.stages.iter().all(|s| !s.actions.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_translator_reaches_thematic_adapter() {
    let (_, orchestrator) = scripted(RawResultsFactory::nightmare());
    let translate = |key: &str, _vars: Option<&BTreeMap<String, String>>| key.to_uppercase();
    let bundle = orchestrator
        .orchestrate(dreams::MELTED, Language::En, None, Some(&translate))
        .await
        .unwrap()
        .bundle;
    assert_eq!(bundle.themes[0].label.as_deref(), Some("THEME.DEATH"));
    assert_eq!(bundle.themes[0].score_norm, Some(100.0));
    assert_eq!(bundle.themes[1].score_norm, Some(50.0));
}

#[tokio::test(start_paused = true)]
async fn test_validate_penalty_toggle_keeps_final_state() {
    let stages = Arc::new(RecordingStages::new(RawResultsFactory::nightmare()));
    let with = Orchestrator::new(stages.stage_set(), PipelineConfig::default()).unwrap();
    let without = Orchestrator::new(
        stages.stage_set(),
        PipelineConfig {
            pre_derive_penalty: false,
            ..Default::default()
        },
    )
    .unwrap();

    let a = with.orchestrate(dreams::MELTED, Language::En, None, None).await.unwrap();
    let b = without.orchestrate(dreams::MELTED, Language::En, None, None).await.unwrap();
    assert_eq!(a.bundle.plausibility, b.bundle.plausibility);
    assert!(a.violations.iter().any(|v| v.rule == "realism_consistency"));
    assert!(b.violations.iter().all(|v| v.rule != "realism_consistency"));
}

#[tokio::test]
async fn test_turkish_narrative() {
    let orchestrator = Orchestrator::heuristic(PipelineConfig::default()).unwrap();
    let bundle = orchestrator
        .orchestrate(dreams::TURKISH, Language::Tr, None, None)
        .await
        .unwrap()
        .bundle;
    assert!(bundle.has_metamorphosis);
    assert!(bundle.entities.people.contains(&"anne".to_string()));
    assert!(bundle.entities.people.contains(&"baba".to_string()));
    assert!(!bundle.entities.has_duplicates());
    assert_eq!(bundle.emotions.primary().map(|l| l.tag.as_str()), Some("fear"));
    assert_eq!(bundle.language, Language::Tr);
}

#[tokio::test]
async fn test_concurrent_requests_get_their_own_bundles() {
    let orchestrator = Orchestrator::heuristic(PipelineConfig::default()).unwrap();
    let (a, b) = tokio::join!(
        orchestrator.orchestrate(dreams::BIZARRE, Language::En, None, None),
        orchestrator.orchestrate(dreams::MUNDANE, Language::En, None, None),
    );
    let (a, b) = (a.unwrap().bundle, b.unwrap().bundle);
    assert_eq!(a.source_text, dreams::BIZARRE);
    assert_eq!(b.source_text, dreams::MUNDANE);
    assert!(a.plausibility.bizarreness > b.plausibility.bizarreness);
    assert!(a.signals.has_dialogue);
}
