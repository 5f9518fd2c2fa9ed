//! Recording Stage Doubles
//!
//! One value implementing all five adapter contracts:
//! - Returns fixed raw results
//! - Records start, end and drop events into a shared log
//! - Can be scripted per stage to fail, stall forever or take longer
//! - Captures the hints each adapter received

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use somnia_core::stages::{
    ContinuityRaw, EmotionRaw, QuantitativeRaw, SleepRaw, ThematicRaw,
};
use somnia_core::{
    ContinuityStage, DemographicsHint, EmotionStage, Language, QuantitativeRequest,
    QuantitativeStage, RawAnalysisResults, SleepHints, SleepStageEstimator, StageError, StageKind,
    StageResult, StageSet, ThematicStage, Translate,
};

/// Something an adapter did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start(StageKind),
    End(StageKind),
    /// The adapter future was dropped before it finished
    Dropped(StageKind),
}

/// Scripted behavior of one stage
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return the fixed result after the default delay
    Return,
    /// Fail with this error after the default delay
    Fail(StageError),
    /// Never complete
    Stall,
    /// Return the fixed result after this delay instead of the default
    Delay(Duration),
}

/// Marks an adapter future as dropped unless it reached its end
struct DropGuard {
    log: Arc<Mutex<Vec<Event>>>,
    kind: StageKind,
    finished: bool,
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        if !self.finished {
            if let Ok(mut log) = self.log.lock() {
                log.push(Event::Dropped(self.kind));
            }
        }
    }
}

/// Stage doubles for all five adapter contracts
///
/// # Example
///
/// ```rust,ignore
/// let stages = Arc::new(
///     RecordingStages::new(RawResultsFactory::nightmare())
///         .with_behavior(StageKind::Sleep, Behavior::Fail(StageError::Timeout)),
/// );
/// let orchestrator = Orchestrator::new(stages.stage_set(), PipelineConfig::default())?;
/// ```
pub struct RecordingStages {
    results: RawAnalysisResults,
    behaviors: HashMap<StageKind, Behavior>,
    delay: Duration,
    log: Arc<Mutex<Vec<Event>>>,
    emotion_hint: Mutex<Option<EmotionRaw>>,
    sleep_hints: Mutex<Option<SleepHints>>,
    model_version: Mutex<Option<String>>,
}

impl RecordingStages {
    /// Doubles returning `results`, each after a 10ms delay
    pub fn new(results: RawAnalysisResults) -> Self {
        Self {
            results,
            behaviors: HashMap::new(),
            delay: Duration::from_millis(10),
            log: Arc::new(Mutex::new(Vec::new())),
            emotion_hint: Mutex::new(None),
            sleep_hints: Mutex::new(None),
            model_version: Mutex::new(None),
        }
    }

    pub fn with_behavior(mut self, kind: StageKind, behavior: Behavior) -> Self {
        self.behaviors.insert(kind, behavior);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Use these doubles for all five adapters
    pub fn stage_set(self: &Arc<Self>) -> StageSet {
        StageSet::uniform(self.clone())
    }

    /// Snapshot of the event log
    pub fn events(&self) -> Vec<Event> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Index of `event` in the log
    pub fn position(&self, event: Event) -> Option<usize> {
        self.events().iter().position(|e| *e == event)
    }

    /// Emotion result the quantitative adapter was handed
    pub fn emotion_hint(&self) -> Option<EmotionRaw> {
        self.emotion_hint.lock().ok().and_then(|h| h.clone())
    }

    pub fn sleep_hints(&self) -> Option<SleepHints> {
        self.sleep_hints.lock().ok().and_then(|h| *h)
    }

    pub fn model_version(&self) -> Option<String> {
        self.model_version.lock().ok().and_then(|m| m.clone())
    }

    fn record(&self, event: Event) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }

    async fn run<T: Send>(&self, kind: StageKind, value: T) -> StageResult<T> {
        self.record(Event::Start(kind));
        let mut guard = DropGuard {
            log: self.log.clone(),
            kind,
            finished: false,
        };

        let behavior = self.behaviors.get(&kind).cloned().unwrap_or(Behavior::Return);
        let outcome = match behavior {
            Behavior::Return => {
                tokio::time::sleep(self.delay).await;
                Ok(value)
            }
            Behavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Behavior::Fail(error) => {
                tokio::time::sleep(self.delay).await;
                Err(error)
            }
            Behavior::Stall => {
                std::future::pending::<()>().await;
                Ok(value)
            }
        };

        guard.finished = true;
        self.record(Event::End(kind));
        outcome
    }
}

#[async_trait]
impl EmotionStage for RecordingStages {
    async fn score(&self, _text: &str, _language: Language) -> StageResult<EmotionRaw> {
        self.run(StageKind::Emotion, self.results.emotion.clone()).await
    }
}

#[async_trait]
impl QuantitativeStage for RecordingStages {
    async fn extract(
        &self,
        _text: &str,
        _language: Language,
        request: QuantitativeRequest<'_>,
    ) -> StageResult<Option<QuantitativeRaw>> {
        if let Ok(mut hint) = self.emotion_hint.lock() {
            *hint = Some(request.emotion_hint.clone());
        }
        if let Ok(mut version) = self.model_version.lock() {
            *version = Some(request.model_version.to_string());
        }
        self.run(StageKind::Quantitative, self.results.quantitative.clone())
            .await
    }
}

#[async_trait]
impl SleepStageEstimator for RecordingStages {
    async fn estimate(
        &self,
        _text: &str,
        hints: SleepHints,
        _language: Language,
    ) -> StageResult<SleepRaw> {
        if let Ok(mut recorded) = self.sleep_hints.lock() {
            *recorded = Some(hints);
        }
        self.run(StageKind::Sleep, self.results.sleep.clone()).await
    }
}

#[async_trait]
impl ContinuityStage for RecordingStages {
    async fn score(
        &self,
        _text: &str,
        _demographics: Option<&DemographicsHint>,
        _language: Language,
    ) -> StageResult<ContinuityRaw> {
        self.run(StageKind::Continuity, self.results.continuity.clone())
            .await
    }
}

#[async_trait]
impl ThematicStage for RecordingStages {
    async fn extract(
        &self,
        _text: &str,
        _language: Language,
        translate: Option<&dyn Translate>,
    ) -> StageResult<ThematicRaw> {
        let mut thematic = self.results.thematic.clone();
        if let Some(translate) = translate {
            for theme in &mut thematic.themes {
                theme.label = Some(translate.translate(&format!("theme.{}", theme.id), None));
            }
        }
        self.run(StageKind::Thematic, thematic).await
    }
}
