//! Entity index
//!
//! Five categorized collections with set semantics: a value appears at
//! most once per category, in first-occurrence order.

use serde::{Deserialize, Serialize};

/// Entity categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    People,
    Animals,
    Places,
    Objects,
    Events,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        EntityCategory::People,
        EntityCategory::Animals,
        EntityCategory::Places,
        EntityCategory::Objects,
        EntityCategory::Events,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::People => "people",
            EntityCategory::Animals => "animals",
            EntityCategory::Places => "places",
            EntityCategory::Objects => "objects",
            EntityCategory::Events => "events",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entities mentioned in the dream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntityIndex {
    pub people: Vec<String>,
    pub animals: Vec<String>,
    pub places: Vec<String>,
    pub objects: Vec<String>,
    pub events: Vec<String>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::People => &self.people,
            EntityCategory::Animals => &self.animals,
            EntityCategory::Places => &self.places,
            EntityCategory::Objects => &self.objects,
            EntityCategory::Events => &self.events,
        }
    }

    pub fn category_mut(&mut self, category: EntityCategory) -> &mut Vec<String> {
        match category {
            EntityCategory::People => &mut self.people,
            EntityCategory::Animals => &mut self.animals,
            EntityCategory::Places => &mut self.places,
            EntityCategory::Objects => &mut self.objects,
            EntityCategory::Events => &mut self.events,
        }
    }

    /// Insert with set semantics. Returns false for empty or already-present values.
    pub fn insert(&mut self, category: EntityCategory, value: impl Into<String>) -> bool {
        let value = value.into();
        let items = self.category_mut(category);
        if value.is_empty() || items.contains(&value) {
            return false;
        }
        items.push(value);
        true
    }

    /// Set union, category by category. Existing order is kept and new
    /// values are appended in `other`'s order.
    pub fn union(&mut self, other: &EntityIndex) {
        for category in EntityCategory::ALL {
            for value in other.category(category) {
                self.insert(category, value.as_str());
            }
        }
    }

    /// Values that occur more than once within their own category
    pub fn duplicates(&self) -> Vec<(EntityCategory, String)> {
        let mut found = Vec::new();
        for category in EntityCategory::ALL {
            let items = self.category(category);
            for (i, value) in items.iter().enumerate() {
                let repeated = items[..i].contains(value);
                let reported = found.iter().any(|(c, v)| *c == category && v == value);
                if repeated && !reported {
                    found.push((category, value.clone()));
                }
            }
        }
        found
    }

    pub fn has_duplicates(&self) -> bool {
        EntityCategory::ALL.iter().any(|&c| {
            let items = self.category(c);
            items.iter().enumerate().any(|(i, v)| items[..i].contains(v))
        })
    }

    /// Remove repeats in place, keeping the first occurrence
    pub fn dedup(&mut self) {
        for category in EntityCategory::ALL {
            let items = std::mem::take(self.category_mut(category));
            let mut kept: Vec<String> = Vec::with_capacity(items.len());
            for value in items {
                if !kept.contains(&value) {
                    kept.push(value);
                }
            }
            *self.category_mut(category) = kept;
        }
    }

    pub fn len(&self) -> usize {
        EntityCategory::ALL.iter().map(|&c| self.category(c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
