//! Heal - presentation-suppression flags

use crate::bundle::AnalysisBundle;

/// Set the three `hide*` flags from the final bundle state. No other
/// field is touched.
pub fn heal(mut bundle: AnalysisBundle) -> AnalysisBundle {
    bundle.hide_emotion_cards = bundle.emotions.labels.is_empty();
    bundle.hide_sleep_percentages = !bundle.sleep.is_known();
    bundle.hide_continuity_data = !bundle.continuity.has_day_data;
    bundle
}
