//! Validate - cross-field consistency rules
//!
//! Every [`Rule`] owns one check and the one correction that fixes it.
//! All checks read the same input snapshot, then each failing rule's
//! correction is applied. Corrections never depend on each other, so the
//! order of [`Rule::ALL`] only fixes the order of reported violations.

use serde_json::json;

use crate::bundle::{AnalysisBundle, Plausibility, Tone, ValidationResult};
use crate::config::PipelineConfig;

/// Consistency rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Stored tone equals the tone the valence triad implies
    ToneConsistency,
    /// A neutral tone next to a dominant positive or negative share
    NeutralToneStrongValence,
    /// Metamorphosis caps physical plausibility; overall follows the
    /// bizarreness-weighted formula
    RealismConsistency,
    /// An unknown sleep stage carries no REM probability
    SleepProbability,
    /// No repeated value within an entity category
    EntityDuplicates,
}

/// What a failed check saw and what its correction will write
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub message: String,
    pub original: serde_json::Value,
    pub corrected: serde_json::Value,
}

impl Rule {
    pub const ALL: [Rule; 5] = [
        Rule::ToneConsistency,
        Rule::NeutralToneStrongValence,
        Rule::RealismConsistency,
        Rule::SleepProbability,
        Rule::EntityDuplicates,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Rule::ToneConsistency => "tone_consistency",
            Rule::NeutralToneStrongValence => "neutral_tone_strong_valence",
            Rule::RealismConsistency => "realism_consistency",
            Rule::SleepProbability => "sleep_probability",
            Rule::EntityDuplicates => "entity_duplicates",
        }
    }

    /// `None` when the bundle satisfies the rule
    pub fn check(&self, bundle: &AnalysisBundle, config: &PipelineConfig) -> Option<Violation> {
        match self {
            Rule::ToneConsistency => {
                let e = &bundle.emotions;
                let expected = e.computed_tone(config.tone_threshold);
                (e.tone != expected).then(|| Violation {
                    message: format!(
                        "Tone '{}' does not match valence pos={:.0} neg={:.0} neu={:.0}",
                        e.tone, e.pos, e.neg, e.neu
                    ),
                    original: json!(e.tone),
                    corrected: json!(expected),
                })
            }
            Rule::NeutralToneStrongValence => {
                let e = &bundle.emotions;
                let dominant = e.pos.max(e.neg);
                (e.tone == Tone::Neutral && dominant >= config.tone_threshold).then(|| Violation {
                    message: format!(
                        "Neutral tone with a {:.0}% {} share",
                        dominant,
                        if e.neg >= e.pos { "negative" } else { "positive" }
                    ),
                    original: json!(e.tone),
                    corrected: json!(e.computed_tone(config.tone_threshold)),
                })
            }
            Rule::RealismConsistency => {
                let current = &bundle.plausibility;
                let mut expected = current.clone();
                apply_realism_penalty(
                    &mut expected,
                    bundle.has_metamorphosis,
                    config.physical_cap,
                    config.bizarreness_weight,
                );
                (expected != *current).then(|| Violation {
                    message: if expected.physical != current.physical {
                        format!(
                            "Physical plausibility {:.0} exceeds the metamorphosis cap {:.0}",
                            current.physical, config.physical_cap
                        )
                    } else {
                        format!(
                            "Overall realism {:.0} does not follow the weighted formula ({:.0})",
                            current.overall, expected.overall
                        )
                    },
                    original: json!({ "physical": current.physical, "overall": current.overall }),
                    corrected: json!({ "physical": expected.physical, "overall": expected.overall }),
                })
            }
            Rule::SleepProbability => {
                let sleep = &bundle.sleep;
                match sleep.prob {
                    Some(prob) if !sleep.is_known() => Some(Violation {
                        message: format!("Sleep stage is unknown but REM probability is {:.0}%", prob),
                        original: json!(prob),
                        corrected: serde_json::Value::Null,
                    }),
                    _ => None,
                }
            }
            Rule::EntityDuplicates => {
                let duplicates = bundle.entities.duplicates();
                if duplicates.is_empty() {
                    return None;
                }
                let mut deduped = bundle.entities.clone();
                deduped.dedup();
                let listed: Vec<String> = duplicates
                    .iter()
                    .map(|(category, value)| format!("{}:{}", category, value))
                    .collect();
                Some(Violation {
                    message: format!("Repeated entities: {}", listed.join(", ")),
                    original: json!(bundle.entities),
                    corrected: json!(deduped),
                })
            }
        }
    }

    /// Deterministic fix for this rule
    pub fn correct(&self, bundle: &mut AnalysisBundle, config: &PipelineConfig) {
        match self {
            Rule::ToneConsistency | Rule::NeutralToneStrongValence => {
                bundle.emotions.tone = bundle.emotions.computed_tone(config.tone_threshold);
            }
            Rule::RealismConsistency => apply_realism_penalty(
                &mut bundle.plausibility,
                bundle.has_metamorphosis,
                config.physical_cap,
                config.bizarreness_weight,
            ),
            Rule::SleepProbability => bundle.sleep.prob = None,
            Rule::EntityDuplicates => bundle.entities.dedup(),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Cap `physical` when a metamorphosis is present, then recompute
/// `overall`. A pure function of the current values.
pub fn apply_realism_penalty(
    plausibility: &mut Plausibility,
    has_metamorphosis: bool,
    physical_cap: f64,
    bizarreness_weight: f64,
) {
    if has_metamorphosis {
        plausibility.physical = plausibility.physical.min(physical_cap);
    }
    plausibility.overall = plausibility.weighted_overall(bizarreness_weight);
}

/// Rules that Validate runs under `config`
pub fn active_rules(config: &PipelineConfig) -> Vec<Rule> {
    Rule::ALL
        .into_iter()
        .filter(|rule| config.pre_derive_penalty || *rule != Rule::RealismConsistency)
        .collect()
}

/// Check every active rule against `bundle`, then apply the corrections
/// of the failing ones. Returns the corrected bundle and the violations.
pub fn validate(
    mut bundle: AnalysisBundle,
    config: &PipelineConfig,
) -> (AnalysisBundle, Vec<ValidationResult>) {
    let failing: Vec<(Rule, Violation)> = active_rules(config)
        .into_iter()
        .filter_map(|rule| rule.check(&bundle, config).map(|v| (rule, v)))
        .collect();

    let mut violations = Vec::with_capacity(failing.len());
    for (rule, violation) in failing {
        tracing::warn!(rule = rule.id(), "{}", violation.message);
        rule.correct(&mut bundle, config);
        violations.push(ValidationResult {
            rule: rule.id().to_string(),
            passed: false,
            message: violation.message,
            original_value: violation.original,
            corrected_value: violation.corrected,
        });
    }

    (bundle, violations)
}
