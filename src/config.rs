//! Optimizer configuration
//!
//! JSON file, every field optional. Missing fields take their defaults so a
//! config that only overrides `max_techniques` is valid.

use crate::evaluator::ScoringRules;
use crate::reduction::{MethodDescriptor, ReductionCatalog};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_TECHNIQUES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// How many ranked techniques `optimize` applies
    pub max_techniques: usize,
    pub scoring_rules: ScoringRules,
    /// Replaces the built-in bias reduction catalog when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_methods: Option<Vec<MethodDescriptor>>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_techniques: DEFAULT_MAX_TECHNIQUES,
            scoring_rules: ScoringRules::default(),
            reduction_methods: None,
        }
    }
}

impl OptimizerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config JSON in {}", path.display()))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// `<data dir>/reasoning-optimizer/config.json`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reasoning-optimizer")
            .join("config.json")
    }

    /// The reduction catalog this config asks for
    pub fn reduction_catalog(&self) -> ReductionCatalog {
        match &self.reduction_methods {
            Some(methods) => ReductionCatalog::from_descriptors(methods.iter().cloned()),
            None => ReductionCatalog::builtin(),
        }
    }
}
