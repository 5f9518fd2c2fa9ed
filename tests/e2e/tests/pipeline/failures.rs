//! Failure propagation tests
//!
//! Any adapter failure fails the whole analysis, and abandoning a
//! request drops whatever adapters are still running.

use std::sync::Arc;
use std::time::Duration;

use somnia_core::{AnalysisError, Language, Orchestrator, PipelineConfig, StageError, StageKind};
use somnia_e2e_tests::harness::{Behavior, Event, RecordingStages};
use somnia_e2e_tests::mocks::{RawResultsFactory, dreams};
use tokio_util::sync::CancellationToken;

fn orchestrator(stages: &Arc<RecordingStages>) -> Orchestrator {
    Orchestrator::new(stages.stage_set(), PipelineConfig::default()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_sleep_failure_fails_the_request() {
    let stages = Arc::new(
        RecordingStages::new(RawResultsFactory::nightmare())
            .with_behavior(StageKind::Sleep, Behavior::Fail(StageError::Timeout))
            .with_behavior(StageKind::Quantitative, Behavior::Stall),
    );
    let err = orchestrator(&stages)
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::Adapter {
            stage: StageKind::Sleep,
            source: StageError::Timeout
        }
    ));
    assert_eq!(err.to_string(), "sleep stage failed: Stage timed out");
    // The stalled sibling was dropped, not left running
    assert!(stages.events().contains(&Event::Dropped(StageKind::Quantitative)));
}

#[tokio::test(start_paused = true)]
async fn test_emotion_failure_starts_nothing_else() {
    let stages = Arc::new(
        RecordingStages::new(RawResultsFactory::nightmare()).with_behavior(
            StageKind::Emotion,
            Behavior::Fail(StageError::Failed("lexicon unavailable".to_string())),
        ),
    );
    let err = orchestrator(&stages)
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(StageKind::Emotion));
    assert_eq!(
        stages.events(),
        vec![Event::Start(StageKind::Emotion), Event::End(StageKind::Emotion)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_output_names_the_stage() {
    let stages = Arc::new(
        RecordingStages::new(RawResultsFactory::nightmare()).with_behavior(
            StageKind::Thematic,
            Behavior::Fail(StageError::InvalidOutput("theme without id".to_string())),
        ),
    );
    let err = orchestrator(&stages)
        .orchestrate(dreams::MELTED, Language::En, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(StageKind::Thematic));
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_invokes_no_adapter() {
    let stages = Arc::new(RecordingStages::new(RawResultsFactory::nightmare()));
    let orchestrator = orchestrator(&stages);

    for text in ["", "   \n\t "] {
        let err = orchestrator
            .orchestrate(text, Language::En, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }
    assert!(stages.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_drops_running_adapters() {
    let stages = Arc::new(
        RecordingStages::new(RawResultsFactory::nightmare())
            .with_behavior(StageKind::Continuity, Behavior::Stall),
    );
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        canceller.cancel();
    });

    let err = orchestrator(&stages)
        .orchestrate_with_cancellation(dreams::MELTED, Language::En, None, None, &token)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Cancelled));
    let events = stages.events();
    assert!(events.contains(&Event::Dropped(StageKind::Continuity)));
    assert!(!events.contains(&Event::End(StageKind::Continuity)));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_request_drops_adapters() {
    let stages = Arc::new(
        RecordingStages::new(RawResultsFactory::nightmare())
            .with_behavior(StageKind::Thematic, Behavior::Stall),
    );
    let orchestrator = orchestrator(&stages);

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        orchestrator.orchestrate(dreams::MELTED, Language::En, None, None),
    )
    .await;

    assert!(outcome.is_err());
    assert!(stages.events().contains(&Event::Dropped(StageKind::Thematic)));
}

#[tokio::test(start_paused = true)]
async fn test_completed_request_is_not_cancelled_afterwards() {
    let stages = Arc::new(RecordingStages::new(RawResultsFactory::nightmare()));
    let token = CancellationToken::new();
    let result = orchestrator(&stages)
        .orchestrate_with_cancellation(dreams::MELTED, Language::En, None, None, &token)
        .await;
    token.cancel();

    assert!(result.is_ok());
    assert!(!stages.events().iter().any(|e| matches!(e, Event::Dropped(_))));
}
