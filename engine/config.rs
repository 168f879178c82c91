use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    catalog::{CatalogMeal, Strategy, SubstitutionCatalog},
    predictor::{HistoryScope, PredictorConfig},
};

/// Engine configuration loaded from a TOML document.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    /// Predictor settings.
    #[serde(default)]
    pub predictor: PredictorSettings,
    /// Substitution settings.
    #[serde(default)]
    pub substitution: SubstitutionSettings,
    /// Catalog extensions.
    #[serde(default)]
    pub catalog: CatalogSettings,
}

/// Predictor section.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PredictorSettings {
    /// History scoping policy (`global` or `per-user`).
    #[serde(default)]
    pub scope: HistoryScope,
    /// Minimum usable samples before a model is fit.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Lower bound on predicted days.
    #[serde(default = "default_floor_days")]
    pub floor_days: u32,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            scope: HistoryScope::default(),
            min_samples: default_min_samples(),
            floor_days: default_floor_days(),
        }
    }
}

/// Substitution section.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SubstitutionSettings {
    /// Whether replacements adopt the original store identifiers.
    #[serde(default = "default_true")]
    pub preserve_identity: bool,
}

impl Default for SubstitutionSettings {
    fn default() -> Self {
        Self {
            preserve_identity: default_true(),
        }
    }
}

/// Catalog section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogSettings {
    /// Additional pool meals appended to the built-in table.
    #[serde(default)]
    pub extra: Vec<ExtraPoolMeal>,
}

/// One configured pool extension.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtraPoolMeal {
    /// Target pool.
    pub strategy: Strategy,
    /// Meal name.
    pub name: String,
    /// Caloric content.
    pub calories: f64,
    /// Dietary classification.
    pub category: String,
}

impl EngineConfig {
    /// Loads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates invariants that serde defaults alone cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.predictor.min_samples == 0 {
            bail!("predictor.min_samples must be at least 1");
        }
        if self.predictor.floor_days == 0 {
            bail!("predictor.floor_days must be at least 1");
        }
        for meal in &self.catalog.extra {
            if meal.calories < 0.0 {
                bail!("catalog entry '{}' has negative calories", meal.name);
            }
        }
        Ok(())
    }

    /// Predictor configuration derived from this document.
    #[must_use]
    pub const fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            scope: self.predictor.scope,
            min_samples: self.predictor.min_samples,
            floor_days: self.predictor.floor_days,
        }
    }

    /// Builds the substitution catalog: built-in pools plus configured extras.
    #[must_use]
    pub fn build_catalog(&self) -> SubstitutionCatalog {
        let mut catalog = SubstitutionCatalog::default();
        for meal in &self.catalog.extra {
            catalog.extend_pool(
                meal.strategy,
                [CatalogMeal::new(
                    meal.name.clone(),
                    meal.calories,
                    meal.category.clone(),
                )],
            );
        }
        catalog
    }
}

const fn default_true() -> bool {
    true
}

const fn default_min_samples() -> usize {
    3
}

const fn default_floor_days() -> u32 {
    1
}
