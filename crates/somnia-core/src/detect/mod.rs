//! Text derivation helpers
//!
//! Stateless scans of the raw narrative, independent of the stage
//! adapters. Derive uses them to compute the metamorphosis flag, the
//! supplementary bizarreness score, naive entity sets and text signals.

mod lexicon;

pub use lexicon::{EmotionWord, Lexicon, METAMORPHOSIS_BIZARRENESS, ThemeKeywords};

use std::sync::Arc;

use crate::bundle::EntityIndex;

/// Text scanners used by Derive
pub trait TextDetectors: Send + Sync {
    /// Curated "impossible transformation" language
    fn detect_metamorphosis(&self, text: &str) -> bool;

    /// Quoted speech or speech verbs
    fn detect_dialogue(&self, text: &str) -> bool;

    /// Keyword-extracted entities, already deduplicated
    fn extract_entities(&self, text: &str) -> EntityIndex;

    /// Any emotion vocabulary at all
    fn detect_emotional_content(&self, text: &str) -> bool;

    /// Independent bizarreness score, 0-100
    fn detect_bizarreness(&self, text: &str) -> f64;
}

/// [`TextDetectors`] backed by the shared [`Lexicon`]
#[derive(Debug, Clone)]
pub struct LexiconDetectors {
    lexicon: Arc<Lexicon>,
}

impl LexiconDetectors {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl TextDetectors for LexiconDetectors {
    fn detect_metamorphosis(&self, text: &str) -> bool {
        self.lexicon.matches_metamorphosis(text)
    }

    fn detect_dialogue(&self, text: &str) -> bool {
        self.lexicon.matches_dialogue(text)
    }

    fn extract_entities(&self, text: &str) -> EntityIndex {
        let mut entities = EntityIndex::new();
        for token in Lexicon::tokenize(text) {
            if let Some((keyword, category)) = self.lexicon.lookup_entity(&token) {
                entities.insert(category, keyword);
            }
        }
        entities
    }

    fn detect_emotional_content(&self, text: &str) -> bool {
        Lexicon::tokenize(text)
            .iter()
            .any(|t| self.lexicon.lookup_emotion(t).is_some())
    }

    fn detect_bizarreness(&self, text: &str) -> f64 {
        self.lexicon.text_bizarreness(text)
    }
}
