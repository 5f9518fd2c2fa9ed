//! Pipeline configuration
//!
//! Loaded once per process and shared read-only by every request:
//!
//! 1. Built-in defaults ([`PipelineConfig::default`])
//! 2. Optional JSON file (explicit path, or `config.json` in the platform config dir)
//! 3. `SOMNIA_*` environment overrides

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default dominance threshold for the tone function
pub const DEFAULT_TONE_THRESHOLD: f64 = 60.0;

/// Default cap on physical plausibility when a metamorphosis is present
pub const DEFAULT_PHYSICAL_CAP: f64 = 50.0;

/// Default weight of the bizarreness penalty on overall plausibility
pub const DEFAULT_BIZARRENESS_WEIGHT: f64 = 0.5;

// ============================================================================
// ERRORS
// ============================================================================

/// Configuration error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON for [`PipelineConfig`]
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    /// Environment override could not be parsed
    #[error("Invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
    /// Value outside its allowed range
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

// ============================================================================
// CONFIG
// ============================================================================

/// Settings forwarded untouched to the quantitative adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionSettings {
    /// Whether the adapter may call a model-assisted extractor
    pub use_model: bool,
    /// Upper bound on characters the adapter reports
    pub max_characters: usize,
    /// Below this many words the adapter may return no result
    pub min_words: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            use_model: false,
            max_characters: 24,
            min_words: 5,
        }
    }
}

/// Configuration for the orchestration pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Stamped into every bundle's metadata
    pub analysis_version: String,
    /// Forwarded to the quantitative adapter
    pub model_version: String,
    /// Minimum dominant share (percent) for a non-neutral tone
    pub tone_threshold: f64,
    /// Cap on physical plausibility when a metamorphosis is present
    pub physical_cap: f64,
    /// Weight of bizarreness in the overall plausibility penalty (0-1)
    pub bizarreness_weight: f64,
    /// Whether Validate applies the realism penalty before Derive does
    pub pre_derive_penalty: bool,
    /// Quantitative extraction settings
    pub extraction: ExtractionSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis_version: crate::VERSION.to_string(),
            model_version: "heuristic-1".to_string(),
            tone_threshold: DEFAULT_TONE_THRESHOLD,
            physical_cap: DEFAULT_PHYSICAL_CAP,
            bizarreness_weight: DEFAULT_BIZARRENESS_WEIGHT,
            pre_derive_penalty: true,
            extraction: ExtractionSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration: file (if any), then environment, then validate.
    ///
    /// With `path == None` the platform config dir is consulted and a
    /// missing file is not an error. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; unspecified fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        tracing::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// `config.json` in the platform-specific config directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "somnia", "core").map(|d| d.config_dir().join("config.json"))
    }

    /// Apply `SOMNIA_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = std::env::var("SOMNIA_ANALYSIS_VERSION") {
            self.analysis_version = v;
        }
        if let Ok(v) = std::env::var("SOMNIA_MODEL_VERSION") {
            self.model_version = v;
        }
        if let Some(v) = env_parse("SOMNIA_TONE_THRESHOLD")? {
            self.tone_threshold = v;
        }
        if let Some(v) = env_parse("SOMNIA_PHYSICAL_CAP")? {
            self.physical_cap = v;
        }
        if let Some(v) = env_parse("SOMNIA_BIZARRENESS_WEIGHT")? {
            self.bizarreness_weight = v;
        }
        if let Some(v) = env_parse("SOMNIA_PRE_DERIVE_PENALTY")? {
            self.pre_derive_penalty = v;
        }
        Ok(())
    }

    /// Check that every numeric knob is within range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let percent = 0.0..=100.0;
        if !percent.contains(&self.tone_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "toneThreshold",
                value: self.tone_threshold,
            });
        }
        if !percent.contains(&self.physical_cap) {
            return Err(ConfigError::OutOfRange {
                field: "physicalCap",
                value: self.physical_cap,
            });
        }
        if !(0.0..=1.0).contains(&self.bizarreness_weight) {
            return Err(ConfigError::OutOfRange {
                field: "bizarrenessWeight",
                value: self.bizarreness_weight,
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
        Err(_) => Ok(None),
    }
}
