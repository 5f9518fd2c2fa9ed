//! Derive - signals computed from the source text itself

use crate::bundle::{AnalysisBundle, TextSignals};
use crate::config::PipelineConfig;
use crate::detect::TextDetectors;

use super::validate::apply_realism_penalty;

/// Augment the validated bundle with text-derived signals.
///
/// The metamorphosis flag found here is authoritative, so the realism
/// penalty is re-applied with it. Bizarreness is raised to the text score
/// first, which keeps `overall` consistent with the final bizarreness.
pub fn derive(
    mut bundle: AnalysisBundle,
    detectors: &dyn TextDetectors,
    config: &PipelineConfig,
) -> AnalysisBundle {
    let text = bundle.source_text.as_str();

    bundle.has_metamorphosis = detectors.detect_metamorphosis(text);
    let text_bizarreness = detectors.detect_bizarreness(text);
    let keyword_entities = detectors.extract_entities(text);
    bundle.signals = TextSignals {
        has_dialogue: detectors.detect_dialogue(text),
        has_emotional_content: detectors.detect_emotional_content(text),
        text_bizarreness,
    };

    bundle.plausibility.bizarreness = bundle.plausibility.bizarreness.max(text_bizarreness);
    apply_realism_penalty(
        &mut bundle.plausibility,
        bundle.has_metamorphosis,
        config.physical_cap,
        config.bizarreness_weight,
    );

    // Set union keeps each category duplicate-free
    bundle.entities.union(&keyword_entities);

    // No day-residue source exists yet
    bundle.continuity.has_day_data = false;

    bundle
}
