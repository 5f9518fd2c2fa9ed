//! Orchestration & Consistency Pipeline
//!
//! One request flows through:
//! - **Invoke**: emotion, then {quantitative, sleep, continuity, thematic} concurrently
//! - **Merge**: project raw results into the bundle shape
//! - **Normalize**: rescale onto the 0-100 basis
//! - **Validate**: consistency rules with paired corrections
//! - **Derive**: text-derived signals, authoritative metamorphosis penalty
//! - **Heal**: presentation-suppression flags
//!
//! The five core stages are strictly sequential; each consumes the
//! previous stage's complete output. Adapter failure, empty input and
//! cancellation fail the whole request with no partial bundle.

mod derive;
mod heal;
mod invoke;
mod merge;
mod normalize;
mod validate;

pub use derive::derive;
pub use heal::heal;
pub use invoke::invoke_stages;
pub use merge::merge;
pub use normalize::{normalize, normalize_themes, normalize_valence};
pub use validate::{Rule, Violation, active_rules, apply_realism_penalty, validate};

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::bundle::{AnalysisBundle, Language, ValidationResult};
use crate::config::PipelineConfig;
use crate::detect::{Lexicon, LexiconDetectors, TextDetectors};
use crate::error::{AnalysisError, Result};
use crate::stages::{DemographicsHint, HeuristicStages, RawAnalysisResults, StageSet, Translate};

// ============================================================================
// STAGE REPORTS
// ============================================================================

/// Which core stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Merge,
    Normalize,
    Validate,
    Derive,
    Heal,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Merge => "merge",
            PipelineStage::Normalize => "normalize",
            PipelineStage::Validate => "validate",
            PipelineStage::Derive => "derive",
            PipelineStage::Heal => "heal",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result from a single core stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub stage: PipelineStage,
    pub duration_ms: u64,
    pub actions: Vec<String>,
}

/// Everything one request produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub bundle: AnalysisBundle,
    /// Untouched adapter output, for consumers of the older shape
    pub raw_results: RawAnalysisResults,
    /// Invariant violations found and corrected by Validate
    pub violations: Vec<ValidationResult>,
    pub stages: Vec<StageReport>,
}

fn timed<T>(stage: PipelineStage, run: impl FnOnce() -> (T, Vec<String>)) -> (T, StageReport) {
    let start = Instant::now();
    let (value, actions) = run();
    let report = StageReport {
        stage,
        duration_ms: start.elapsed().as_millis() as u64,
        actions,
    };
    tracing::debug!(stage = %stage, duration_ms = report.duration_ms, "Core stage complete");
    (value, report)
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Runs the stage adapters and the five core stages for each request.
///
/// Holds no per-request state; one orchestrator can serve many concurrent
/// requests, each with its own bundle.
pub struct Orchestrator {
    stages: StageSet,
    config: PipelineConfig,
    lexicon: Arc<Lexicon>,
    detectors: Arc<dyn TextDetectors>,
}

impl Orchestrator {
    /// Orchestrator over `stages` with freshly built lexicon tables
    pub fn new(stages: StageSet, config: PipelineConfig) -> Result<Self> {
        Self::with_lexicon(stages, config, Arc::new(Lexicon::new()?))
    }

    /// Orchestrator sharing an existing lexicon
    pub fn with_lexicon(
        stages: StageSet,
        config: PipelineConfig,
        lexicon: Arc<Lexicon>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            stages,
            config,
            detectors: Arc::new(LexiconDetectors::new(lexicon.clone())),
            lexicon,
        })
    }

    /// Orchestrator over the built-in heuristic adapters
    pub fn heuristic(config: PipelineConfig) -> Result<Self> {
        let lexicon = Arc::new(Lexicon::new()?);
        let stages = StageSet::uniform(Arc::new(HeuristicStages::new(lexicon.clone())));
        Self::with_lexicon(stages, config, lexicon)
    }

    /// Replace the text detectors used by Derive
    pub fn with_detectors(mut self, detectors: Arc<dyn TextDetectors>) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn detectors(&self) -> &dyn TextDetectors {
        self.detectors.as_ref()
    }

    /// Analyze one dream narrative.
    ///
    /// Dropping the returned future cancels every adapter call in flight.
    pub async fn orchestrate(
        &self,
        text: &str,
        language: Language,
        demographics: Option<&DemographicsHint>,
        translate: Option<&dyn Translate>,
    ) -> Result<OrchestrationResult> {
        if text.trim().is_empty() {
            return Err(AnalysisError::DegenerateInput(
                "dream text is empty".to_string(),
            ));
        }

        let span = tracing::info_span!(
            "analysis",
            request_id = %Uuid::new_v4(),
            language = %language
        );

        async move {
            tracing::info!(chars = text.chars().count(), "Starting analysis");
            let raw = invoke_stages(
                &self.stages,
                text,
                language,
                demographics,
                translate,
                &self.config,
            )
            .await?;
            let result = self.run_core(raw, text, language);
            tracing::info!(
                tone = %result.bundle.emotions.tone,
                sleep_stage = %result.bundle.sleep.stage,
                metamorphosis = result.bundle.has_metamorphosis,
                violations = result.violations.len(),
                "Analysis complete"
            );
            Ok::<_, AnalysisError>(result)
        }
        .instrument(span)
        .await
    }

    /// [`Self::orchestrate`], abandoned as soon as `token` is cancelled
    pub async fn orchestrate_with_cancellation(
        &self,
        text: &str,
        language: Language,
        demographics: Option<&DemographicsHint>,
        translate: Option<&dyn Translate>,
        token: &CancellationToken,
    ) -> Result<OrchestrationResult> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("Analysis cancelled by caller");
                Err(AnalysisError::Cancelled)
            }
            result = self.orchestrate(text, language, demographics, translate) => result,
        }
    }

    /// Merge, Normalize, Validate, Derive and Heal over already-collected
    /// raw results
    pub fn run_core(
        &self,
        raw: RawAnalysisResults,
        text: &str,
        language: Language,
    ) -> OrchestrationResult {
        let config = &self.config;
        let mut stages = Vec::with_capacity(5);

        // ==================== MERGE ====================
        let (bundle, report) = timed(PipelineStage::Merge, || {
            let bundle = merge(&raw, text, language, &self.lexicon, config);
            let actions = vec![
                format!(
                    "Merged {} emotion labels, {} themes, {} entities",
                    bundle.emotions.labels.len(),
                    bundle.themes.len(),
                    bundle.entities.len()
                ),
                format!("Sleep stage: {}", bundle.sleep.stage),
            ];
            (bundle, actions)
        });
        stages.push(report);

        // ==================== NORMALIZE ====================
        let (bundle, report) = timed(PipelineStage::Normalize, || {
            let before = bundle.emotions.valence_total();
            let bundle = normalize(bundle);
            let scored = bundle.themes.iter().filter(|t| t.score_norm.is_some()).count();
            let actions = vec![
                format!(
                    "Valence triad total {:.2} -> {:.2}",
                    before,
                    bundle.emotions.valence_total()
                ),
                format!("{} of {} themes normalized", scored, bundle.themes.len()),
            ];
            (bundle, actions)
        });
        stages.push(report);

        // ==================== VALIDATE ====================
        let ((bundle, violations), report) = timed(PipelineStage::Validate, || {
            let checked = active_rules(config).len();
            let (bundle, violations) = validate(bundle, config);
            let mut actions = vec![format!(
                "{} rules checked, {} corrected",
                checked,
                violations.len()
            )];
            actions.extend(violations.iter().map(|v| format!("Corrected {}", v.rule)));
            ((bundle, violations), actions)
        });
        stages.push(report);

        // ==================== DERIVE ====================
        let (bundle, report) = timed(PipelineStage::Derive, || {
            let bizarreness_before = bundle.plausibility.bizarreness;
            let entities_before = bundle.entities.len();
            let bundle = derive(bundle, self.detectors.as_ref(), config);
            let actions = vec![
                format!("Metamorphosis: {}", bundle.has_metamorphosis),
                format!(
                    "Bizarreness {:.0} -> {:.0}, overall realism {:.0}",
                    bizarreness_before, bundle.plausibility.bizarreness, bundle.plausibility.overall
                ),
                format!("Entities {} -> {}", entities_before, bundle.entities.len()),
            ];
            (bundle, actions)
        });
        stages.push(report);

        // ==================== HEAL ====================
        let (bundle, report) = timed(PipelineStage::Heal, || {
            let bundle = heal(bundle);
            let actions = vec![format!(
                "hideEmotionCards={} hideSleepPercentages={} hideContinuityData={}",
                bundle.hide_emotion_cards, bundle.hide_sleep_percentages, bundle.hide_continuity_data
            )];
            (bundle, actions)
        });
        stages.push(report);

        OrchestrationResult {
            bundle,
            raw_results: raw,
            violations,
            stages,
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("stages", &self.stages)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
