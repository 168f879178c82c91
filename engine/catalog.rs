use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::knowledge::ImpactClass;

/// Compensation strategy selecting a candidate-meal pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Low-calorie meals to burn off an excess.
    Light,
    /// Protein-heavy meals to rebuild from a deficit.
    ProteinForward,
    /// Cleansing meals for a mild excess.
    Detox,
}

impl Strategy {
    /// Lower-case strategy name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::ProteinForward => "protein-forward",
            Self::Detox => "detox",
        }
    }

    /// Fixed class-to-pool mapping. This is the only behavioral difference
    /// between impact classes.
    #[must_use]
    pub const fn for_class(class: ImpactClass) -> Self {
        match class {
            ImpactClass::Excess => Self::Light,
            ImpactClass::Deficit => Self::ProteinForward,
            ImpactClass::MildExcess => Self::Detox,
        }
    }
}

/// Candidate replacement meal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMeal {
    /// Meal name.
    pub name: String,
    /// Caloric content.
    pub calories: f64,
    /// Dietary classification carried onto the replacement entry.
    pub category: String,
}

impl CatalogMeal {
    /// Creates a catalog meal.
    #[must_use]
    pub fn new(name: impl Into<String>, calories: f64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calories,
            category: category.into(),
        }
    }
}

/// Built-in pools, constructed once at first use and read-only thereafter.
static BUILTIN_POOLS: Lazy<IndexMap<Strategy, Vec<CatalogMeal>>> = Lazy::new(|| {
    IndexMap::from([
        (
            Strategy::Light,
            vec![
                CatalogMeal::new("chicken salad", 150.0, "light"),
                CatalogMeal::new("vegetable soup", 100.0, "light"),
                CatalogMeal::new("tuna with cucumber", 120.0, "light"),
                CatalogMeal::new("steamed chicken", 180.0, "light"),
            ],
        ),
        (
            Strategy::ProteinForward,
            vec![
                CatalogMeal::new("egg-white omelette", 200.0, "protein"),
                CatalogMeal::new("grilled chicken", 220.0, "protein"),
                CatalogMeal::new("protein shake", 250.0, "protein"),
                CatalogMeal::new("tofu with vegetables", 180.0, "protein"),
            ],
        ),
        (
            Strategy::Detox,
            vec![
                CatalogMeal::new("green salad", 90.0, "detox"),
                CatalogMeal::new("fresh juice", 80.0, "detox"),
                CatalogMeal::new("lentil soup", 120.0, "detox"),
                CatalogMeal::new("pumpkin puree", 110.0, "detox"),
            ],
        ),
    ])
});

/// Candidate-meal pools grouped by strategy. Starts from the built-in table
/// and can be extended with externally sampled meals without touching it.
#[derive(Debug, Clone)]
pub struct SubstitutionCatalog {
    pools: IndexMap<Strategy, Vec<CatalogMeal>>,
}

impl Default for SubstitutionCatalog {
    fn default() -> Self {
        Self {
            pools: BUILTIN_POOLS.clone(),
        }
    }
}

impl SubstitutionCatalog {
    /// Pool serving the given impact class.
    #[must_use]
    pub fn pool_for(&self, class: ImpactClass) -> &[CatalogMeal] {
        self.pools
            .get(&Strategy::for_class(class))
            .map_or(&[], Vec::as_slice)
    }

    /// Pool for an explicit strategy.
    #[must_use]
    pub fn pool(&self, strategy: Strategy) -> &[CatalogMeal] {
        self.pools.get(&strategy).map_or(&[], Vec::as_slice)
    }

    /// Appends externally sampled meals to one pool.
    pub fn extend_pool(&mut self, strategy: Strategy, meals: impl IntoIterator<Item = CatalogMeal>) {
        self.pools.entry(strategy).or_default().extend(meals);
    }
}
