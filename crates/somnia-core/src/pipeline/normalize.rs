//! Normalize - put every score on the 0-100 percentage basis
//!
//! Both rescalings are idempotent.

use crate::bundle::{AnalysisBundle, EmotionIndex, ThemeIndex};

/// Rescale the valence triad and the theme scores
pub fn normalize(mut bundle: AnalysisBundle) -> AnalysisBundle {
    normalize_valence(&mut bundle.emotions);
    normalize_themes(&mut bundle.themes);
    bundle
}

/// Proportionally scale pos/neg/neu to sum to 100. A zero sum is left as-is.
pub fn normalize_valence(emotions: &mut EmotionIndex) {
    let total = emotions.valence_total();
    if total <= 0.0 {
        return;
    }
    emotions.pos = emotions.pos / total * 100.0;
    emotions.neg = emotions.neg / total * 100.0;
    emotions.neu = emotions.neu / total * 100.0;
}

/// `scoreNorm = scoreRaw / max * 100`. Order is not touched; with no
/// positive raw score every `scoreNorm` stays unset.
pub fn normalize_themes(themes: &mut [ThemeIndex]) {
    let max = themes.iter().map(|t| t.score_raw).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return;
    }
    for theme in themes.iter_mut() {
        theme.score_norm = Some(theme.score_raw / max * 100.0);
    }
}
