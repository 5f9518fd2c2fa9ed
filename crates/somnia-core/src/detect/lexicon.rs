//! Keyword and pattern tables
//!
//! Built once, then shared read-only behind an `Arc` by the text
//! detectors, the merge classifier and the heuristic adapters. Adding a
//! language means adding rows, not branches.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::bundle::{EntityCategory, Language};

/// Turkish stems shorter than this only match exactly
const MIN_STEM_CHARS: usize = 4;

/// Score added by the text bizarreness scorer when a metamorphosis is found
pub const METAMORPHOSIS_BIZARRENESS: f64 = 30.0;

/// Lexicon entry for an emotion word
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionWord {
    pub tag: &'static str,
    /// -1.0 (very negative) to 1.0 (very positive)
    pub valence: f64,
    /// 0.0 (calm) to 1.0 (extremely arousing)
    pub arousal: f64,
}

/// Keywords that signal one theme
#[derive(Debug, Clone)]
pub struct ThemeKeywords {
    pub id: &'static str,
    pub keywords: Vec<&'static str>,
}

#[derive(Debug)]
struct WeightedPattern {
    regex: Regex,
    weight: f64,
}

/// Immutable keyword/pattern tables for all supported languages
#[derive(Debug)]
pub struct Lexicon {
    entities: HashMap<Language, HashMap<&'static str, EntityCategory>>,
    animal_hints: HashSet<&'static str>,
    emotions: HashMap<Language, HashMap<&'static str, EmotionWord>>,
    negations: HashSet<&'static str>,
    metamorphosis: Vec<Regex>,
    bizarreness: Vec<WeightedPattern>,
    dialogue: Vec<Regex>,
    themes: Vec<ThemeKeywords>,
}

impl Lexicon {
    /// Build all tables and compile every pattern
    pub fn new() -> Result<Self, regex::Error> {
        let metamorphosis = METAMORPHOSIS_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let bizarreness = BIZARRENESS_PATTERNS
            .iter()
            .map(|(p, weight)| {
                Ok(WeightedPattern {
                    regex: Regex::new(p)?,
                    weight: *weight,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        let dialogue = DIALOGUE_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entities: Self::build_entities(),
            animal_hints: ANIMAL_TYPE_HINTS.iter().copied().collect(),
            emotions: Self::build_emotions(),
            negations: NEGATIONS.iter().copied().collect(),
            metamorphosis,
            bizarreness,
            dialogue,
            themes: Self::build_themes(),
        })
    }

    /// Lowercased words with surrounding punctuation stripped
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Canonical keyword and category for a token, in any language
    pub fn lookup_entity(&self, token: &str) -> Option<(&'static str, EntityCategory)> {
        for language in Language::ALL {
            if let Some((keyword, category)) = self.entities[&language].get_key_value(token) {
                return Some((*keyword, *category));
            }
        }
        for singular in english_singulars(token) {
            if let Some((keyword, category)) = self.entities[&Language::En].get_key_value(singular) {
                return Some((*keyword, *category));
            }
        }
        stem_match(&self.entities[&Language::Tr], token).map(|(k, c)| (k, *c))
    }

    /// Whether a token names an animal or an animal type
    pub fn is_animal_token(&self, token: &str) -> bool {
        self.animal_hints.contains(token)
            || matches!(self.lookup_entity(token), Some((_, EntityCategory::Animals)))
    }

    /// Emotion lexicon entry for a token, in any language
    pub fn lookup_emotion(&self, token: &str) -> Option<&EmotionWord> {
        for language in Language::ALL {
            if let Some(word) = self.emotions[&language].get(token) {
                return Some(word);
            }
        }
        stem_match(&self.emotions[&Language::Tr], token).map(|(_, w)| w)
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    pub fn matches_metamorphosis(&self, text: &str) -> bool {
        self.metamorphosis.iter().any(|re| re.is_match(text))
    }

    pub fn matches_dialogue(&self, text: &str) -> bool {
        self.dialogue.iter().any(|re| re.is_match(text))
    }

    /// Sum of the weights of every bizarreness pattern found in `text`
    pub fn bizarreness_weight(&self, text: &str) -> f64 {
        self.bizarreness
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.weight)
            .sum()
    }

    /// Pattern weights plus the metamorphosis bonus, clamped to 0-100
    pub fn text_bizarreness(&self, text: &str) -> f64 {
        let mut score = self.bizarreness_weight(text);
        if self.matches_metamorphosis(text) {
            score += METAMORPHOSIS_BIZARRENESS;
        }
        score.clamp(0.0, 100.0)
    }

    pub fn themes(&self) -> &[ThemeKeywords] {
        &self.themes
    }

    fn build_entities() -> HashMap<Language, HashMap<&'static str, EntityCategory>> {
        let mut tables = HashMap::new();
        for (language, rows) in [(Language::En, ENTITY_KEYWORDS_EN), (Language::Tr, ENTITY_KEYWORDS_TR)] {
            let mut table = HashMap::new();
            for (category, words) in rows {
                for word in *words {
                    table.insert(*word, *category);
                }
            }
            tables.insert(language, table);
        }
        tables
    }

    fn build_emotions() -> HashMap<Language, HashMap<&'static str, EmotionWord>> {
        let mut tables = HashMap::new();
        for (language, rows) in [(Language::En, EMOTION_WORDS_EN), (Language::Tr, EMOTION_WORDS_TR)] {
            let mut table = HashMap::new();
            for &(word, tag, valence, arousal) in rows.iter() {
                table.insert(word, EmotionWord { tag, valence, arousal });
            }
            tables.insert(language, table);
        }
        tables
    }

    fn build_themes() -> Vec<ThemeKeywords> {
        THEME_KEYWORDS
            .iter()
            .map(|&(id, keywords)| ThemeKeywords {
                id,
                keywords: keywords.to_vec(),
            })
            .collect()
    }
}

/// Candidate singular forms of an English plural ("houses" -> "house", "boxes" -> "box")
fn english_singulars(token: &str) -> impl Iterator<Item = &str> {
    [token.strip_suffix('s'), token.strip_suffix("es")]
        .into_iter()
        .flatten()
        .filter(|s| s.len() > 2)
}

/// Longest Turkish stem that prefixes `token` (suffixes carry case and possession)
fn stem_match<'a, V>(table: &'a HashMap<&'static str, V>, token: &str) -> Option<(&'static str, &'a V)> {
    table
        .iter()
        .filter(|(stem, _)| stem.chars().count() >= MIN_STEM_CHARS && token.starts_with(**stem))
        .max_by_key(|(stem, _)| stem.len())
        .map(|(stem, v)| (*stem, v))
}

// ============================================================================
// TABLES
// ============================================================================

const ANIMAL_TYPE_HINTS: &[&str] = &[
    "animal", "animals", "creature", "pet", "beast", "hayvan", "yaratık", "evcil",
];

const ENTITY_KEYWORDS_EN: &[(EntityCategory, &[&str])] = &[
    (EntityCategory::People, &[
        "mother", "mom", "father", "dad", "brother", "sister", "friend", "teacher", "boss",
        "child", "baby", "grandmother", "grandma", "grandfather", "grandpa", "man", "woman",
        "stranger", "husband", "wife", "boyfriend", "girlfriend", "doctor", "police",
        "neighbor", "family", "son", "daughter",
    ]),
    (EntityCategory::Animals, &[
        "dog", "cat", "snake", "bird", "horse", "wolf", "spider", "fish", "lion", "tiger",
        "bear", "rat", "mouse", "insect", "bee", "butterfly", "dragon", "owl", "shark",
    ]),
    (EntityCategory::Places, &[
        "house", "home", "school", "forest", "sea", "beach", "city", "street", "room",
        "hospital", "church", "mosque", "office", "garden", "mountain", "river", "lake",
        "building", "village", "airport", "bridge", "cave", "field", "kitchen",
    ]),
    (EntityCategory::Objects, &[
        "car", "door", "key", "phone", "knife", "gun", "mirror", "book", "window", "bag",
        "money", "ring", "stairs", "elevator", "train", "plane", "bus", "bed", "clock",
        "letter", "box",
    ]),
    (EntityCategory::Events, &[
        "wedding", "exam", "funeral", "party", "birthday", "war", "accident", "interview",
        "concert", "graduation", "meeting", "trip", "holiday",
    ]),
];

const ENTITY_KEYWORDS_TR: &[(EntityCategory, &[&str])] = &[
    (EntityCategory::People, &[
        "anne", "baba", "kardeş", "abla", "abi", "arkadaş", "öğretmen", "patron", "çocuk",
        "bebek", "nine", "dede", "babaanne", "anneanne", "adam", "kadın", "yabancı", "koca",
        "sevgili", "doktor", "polis", "komşu", "aile",
    ]),
    (EntityCategory::Animals, &[
        "köpek", "kedi", "yılan", "kuş", "kurt", "örümcek", "balık", "aslan", "kaplan",
        "ayı", "fare", "böcek", "arı", "kelebek", "ejderha", "baykuş",
    ]),
    (EntityCategory::Places, &[
        "ev", "okul", "orman", "deniz", "şehir", "sokak", "oda", "hastane", "cami", "kilise",
        "ofis", "bahçe", "dağ", "nehir", "göl", "bina", "köy", "havaalanı", "köprü",
        "mağara", "mutfak", "sahil",
    ]),
    (EntityCategory::Objects, &[
        "araba", "kapı", "anahtar", "telefon", "bıçak", "silah", "ayna", "kitap", "pencere",
        "çanta", "para", "yüzük", "merdiven", "asansör", "tren", "uçak", "otobüs", "yatak",
        "saat", "mektup", "kutu",
    ]),
    (EntityCategory::Events, &[
        "düğün", "sınav", "cenaze", "parti", "savaş", "kaza", "mülakat", "konser",
        "mezuniyet", "toplantı", "yolculuk", "tatil",
    ]),
];

const EMOTION_WORDS_EN: &[(&str, &str, f64, f64)] = &[
    // Fear
    ("afraid", "fear", -0.7, 0.8), ("scared", "fear", -0.7, 0.8),
    ("terrified", "fear", -0.9, 0.9), ("fear", "fear", -0.7, 0.8),
    ("frightened", "fear", -0.7, 0.8), ("panic", "fear", -0.8, 0.9),
    ("horror", "fear", -0.9, 0.9), ("nightmare", "fear", -0.8, 0.8),
    ("anxious", "fear", -0.6, 0.7), ("nervous", "fear", -0.5, 0.6),
    ("chased", "fear", -0.5, 0.8),
    // Joy
    ("happy", "joy", 0.8, 0.6), ("joy", "joy", 0.9, 0.7), ("excited", "joy", 0.7, 0.8),
    ("wonderful", "joy", 0.8, 0.6), ("beautiful", "joy", 0.7, 0.5),
    ("laughing", "joy", 0.8, 0.6), ("amazing", "joy", 0.9, 0.8), ("free", "joy", 0.6, 0.5),
    ("love", "love", 0.8, 0.6), ("loved", "love", 0.8, 0.6),
    // Calm
    ("peaceful", "calm", 0.6, 0.1), ("calm", "calm", 0.5, 0.1), ("relieved", "calm", 0.6, 0.3),
    ("safe", "calm", 0.5, 0.2),
    // Sadness
    ("sad", "sadness", -0.7, 0.3), ("crying", "sadness", -0.7, 0.5),
    ("cried", "sadness", -0.7, 0.5), ("lonely", "sadness", -0.6, 0.3),
    ("grief", "sadness", -0.8, 0.4), ("miss", "sadness", -0.4, 0.3),
    // Anger
    ("angry", "anger", -0.7, 0.8), ("furious", "anger", -0.9, 0.9),
    ("rage", "anger", -0.9, 0.9), ("yelled", "anger", -0.5, 0.8),
    // Surprise
    ("surprised", "surprise", 0.1, 0.7), ("strange", "surprise", -0.1, 0.6),
    ("weird", "surprise", -0.2, 0.5), ("shocked", "surprise", -0.3, 0.8),
    ("confused", "surprise", -0.3, 0.4),
    // Shame
    ("ashamed", "shame", -0.7, 0.5), ("embarrassed", "shame", -0.6, 0.6),
    ("naked", "shame", -0.4, 0.6),
];

const EMOTION_WORDS_TR: &[(&str, &str, f64, f64)] = &[
    ("kork", "fear", -0.7, 0.8), ("korku", "fear", -0.7, 0.8), ("dehşet", "fear", -0.9, 0.9),
    ("panik", "fear", -0.8, 0.9), ("endişe", "fear", -0.6, 0.7), ("kabus", "fear", -0.8, 0.8),
    ("mutlu", "joy", 0.8, 0.6), ("sevin", "joy", 0.8, 0.7), ("harika", "joy", 0.9, 0.7),
    ("güzel", "joy", 0.7, 0.5), ("gülüyor", "joy", 0.8, 0.6), ("sevgi", "love", 0.8, 0.6),
    ("huzur", "calm", 0.6, 0.1), ("sakin", "calm", 0.5, 0.1), ("rahatla", "calm", 0.6, 0.3),
    ("üzgün", "sadness", -0.7, 0.3), ("üzül", "sadness", -0.7, 0.4),
    ("ağla", "sadness", -0.7, 0.5), ("yalnız", "sadness", -0.6, 0.3),
    ("kızgın", "anger", -0.7, 0.8), ("sinir", "anger", -0.7, 0.8), ("öfke", "anger", -0.9, 0.9),
    ("şaşır", "surprise", 0.1, 0.7), ("garip", "surprise", -0.1, 0.6),
    ("tuhaf", "surprise", -0.2, 0.5), ("utan", "shame", -0.7, 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "didn't", "wasn't", "weren't", "couldn't", "without",
    "hardly", "değil", "değildi", "hiç",
];

const METAMORPHOSIS_PATTERNS: &[&str] = &[
    r"(?i)\b(turned|turning|turns|transformed|transforming|morphed|morphing|changed)\s+into\s+(?:a\s+|an\s+|the\s+)?(bird|cat|dog|wolf|snake|fish|tree|stone|rock|statue|monster|animal|insect|spider|butterfly|dragon|ghost|shadow|smoke|water|dust|ash|sand|glass|child|baby|someone else|another person)\b",
    r"(?i)\b(melted|dissolved|evaporated|faded)\s+(?:into|to)\s+(nothing|nothingness|thin air|the floor|the ground|water|a puddle|smoke|mist)\b",
    r"(?i)\b(vanished|disappeared)\s+into\s+thin\s+air\b",
    r"(?i)\b(my|his|her|their)\s+(face|body|hands?|skin|arms?|legs?)\s+(?:melted|dissolved)\s+(?:away|into)\b",
    r"(?i)\b(my|his|her|their)\s+(face|body|hands?|skin|arms?|legs?)\s+(?:turned\s+to|became)\s+(stone|dust|ash|glass|sand|smoke|water|wax|liquid|transparent|invisible)\b",
    r"(?i)\b(grew|sprouted)\s+(wings|feathers|scales|fur|a tail|horns)\b",
    r"(?i)\bshape[- ]?shift(?:ed|ing|er)?\b",
    r"(?i)\bbecame\s+(?:a|an)\s+(bird|cat|dog|wolf|snake|fish|tree|statue|monster|animal|ghost|dragon|butterfly)\b",
    r"(?i)\b(kuş|kedi|köpek|kurt|yılan|balık|ağaç|taş|heykel|canavar|hayvan|kelebek|ejderha|hayalet|duman|su|toz|kül)(?:a|e|ya|ye)\s+dönüş\w*",
    r"(?i)\beri(?:yip|di|yerek)\s+(?:yok oldu|kayboldu|gitti)",
    r"(?i)\b(?:buhar|duman)\s+olup\s+(?:uçtu|gitti|kayboldu)",
    r"(?i)\b(?:kanat|tüy|pul|kuyruk|boynuz)\w*\s+(?:çıktı|çıkardım|çıkardı|bitti)",
];

const BIZARRENESS_PATTERNS: &[(&str, f64)] = &[
    (r"(?i)\b(?:i|we)\s+(?:was|were)\s+flying\b|\bflew\s+(?:over|above|through)\b|\bcould\s+fly\b", 25.0),
    (r"(?i)\b(?:suddenly|all of a sudden)\b", 10.0),
    (r"(?i)\bsomehow\b", 10.0),
    (r"(?i)\b(?:dead|deceased|late)\s+(?:grandmother|grandfather|mother|father|friend|grandma|grandpa)\b", 20.0),
    (r"(?i)\b(?:cat|dog|bird|horse|snake|animal|fish)s?\s+(?:spoke|talked|said|told)\b", 25.0),
    (r"(?i)\bbreath(?:e|ing)\s+underwater\b", 20.0),
    (r"(?i)\b(?:walls?|floor|ground|room)\s+(?:moved|melted|breathed|shifted)\b", 20.0),
    (r"(?i)\bteleport(?:ed|ing)?\b|\bwas\s+suddenly\s+(?:in|at)\b", 20.0),
    (r"(?i)\b(?:uçuyordum|uçtum|uçabiliyordum)\b", 25.0),
    (r"(?i)\b(?:birden|aniden|bir anda)\b", 10.0),
    (r"(?i)\b(?:nasılsa|bir şekilde)\b", 10.0),
    (r"(?i)\b(?:ölmüş|rahmetli)\s+\w+", 20.0),
    (r"(?i)\b(?:kedi|köpek|kuş|yılan|hayvan|balık)\w*\s+(?:konuştu|konuşuyordu|dedi|söyledi)\b", 25.0),
    (r"(?i)\bsu\s+altında\s+nefes\b", 20.0),
];

const DIALOGUE_PATTERNS: &[&str] = &[
    r#"["“«][^"”»]{2,}["”»]"#,
    r"(?i)\b(?:said|says|told me|asked|shouted|whispered|replied|yelled)\b",
    r"(?i)\b(?:dedi|diyordu|söyledi|sordu|bağırdı|fısıldadı|cevap verdi)\b",
];

const THEME_KEYWORDS: &[(&str, &[&str])] = &[
    ("falling", &["fall", "falling", "fell", "düştüm", "düşüyordum", "düşmek"]),
    ("being_chased", &["chased", "chasing", "running away", "kovalıyor", "kovaladı", "kaçıyordum"]),
    ("flying", &["flying", "flew", "fly", "uçuyordum", "uçtum", "uçmak"]),
    ("death", &["dead", "died", "death", "funeral", "öldü", "ölüm", "cenaze", "ölmüş"]),
    ("water", &["water", "sea", "ocean", "flood", "drowning", "su", "deniz", "sel", "boğul"]),
    ("exam", &["exam", "test", "unprepared", "sınav", "hazırlıksız"]),
    ("teeth", &["teeth", "tooth", "diş", "dişlerim"]),
    ("lost", &["lost", "couldn't find", "kayboldum", "bulamadım"]),
    ("family", &["mother", "father", "family", "anne", "baba", "aile"]),
    ("transformation", &["turned into", "transformed", "became a", "dönüştü", "dönüştüm"]),
];
