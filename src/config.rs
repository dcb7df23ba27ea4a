use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::cluster::ClusterConfig;
use crate::models::{DEFAULT_FEATURES, FeatureSchema};
use crate::scale::DegeneratePolicy;

/// Settings loaded from `config.toml`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ordered feature schema
    pub features: Vec<String>,

    /// Drop schema features that the loaded catalog has no column for
    pub drop_absent_features: bool,

    /// Handling of zero-variance features
    pub degenerate_policy: DegeneratePolicy,

    /// Default recommendation count
    pub recommendations: usize,

    pub clustering: ClusteringSection,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringSection {
    pub k: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub restarts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            features: DEFAULT_FEATURES.iter().map(ToString::to_string).collect(),
            drop_absent_features: true,
            degenerate_policy: DegeneratePolicy::Reject,
            recommendations: 5,
            clustering: ClusteringSection::default(),
        }
    }
}

impl Default for ClusteringSection {
    fn default() -> Self {
        let defaults = ClusterConfig::default();
        Self {
            k: 4,
            seed: 42,
            max_iterations: defaults.max_iterations,
            restarts: defaults.restarts,
        }
    }
}

impl ClusteringSection {
    #[must_use]
    pub fn engine_config(&self) -> ClusterConfig {
        ClusterConfig {
            max_iterations: self.max_iterations,
            restarts: self.restarts,
        }
    }
}

/// `<config dir>/vibe/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vibe").join("config.toml"))
}

impl Config {
    /// Load from `path`, else from the default location if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Validated feature schema.
    pub fn schema(&self) -> anyhow::Result<FeatureSchema> {
        FeatureSchema::new(self.features.iter().cloned()).context("invalid `features` in config")
    }
}
