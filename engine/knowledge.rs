use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{module::EngineError, normalize::normalize_category};

/// Coarse behavioral classification of an event's caloric impact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactClass {
    /// Caloric excess to burn off.
    Excess,
    /// Caloric deficit to rebuild from.
    Deficit,
    /// Mild excess handled with a gentler strategy.
    MildExcess,
}

/// Known life-event categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    /// Celebration with heavy eating.
    Party,
    /// Travel with irregular meals.
    Trip,
    /// Illness with reduced intake.
    Illness,
    /// Stress eating.
    Stress,
    /// Unstructured day off.
    DayOff,
}

impl EventCategory {
    /// Canonical lower-case name used for lookup and persistence.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::Trip => "trip",
            Self::Illness => "illness",
            Self::Stress => "stress",
            Self::DayOff => "day-off",
        }
    }

    /// All known categories.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Party,
            Self::Trip,
            Self::Illness,
            Self::Stress,
            Self::DayOff,
        ]
    }
}

/// Static knowledge about one event category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventImpact {
    /// Signed caloric impact; positive = excess, negative = deficit.
    pub caloric_impact: i32,
    /// Compensation days applied when no trained model is available. Always >= 1.
    pub default_compensation_days: u32,
    /// Behavioral class selecting the substitution strategy.
    pub impact_class: ImpactClass,
}

/// Canonical event table, built once at first use and read-only thereafter.
static KNOWLEDGE_BASE: Lazy<IndexMap<EventCategory, EventImpact>> = Lazy::new(|| {
    IndexMap::from([
        (
            EventCategory::Party,
            EventImpact {
                caloric_impact: 600,
                default_compensation_days: 3,
                impact_class: ImpactClass::Excess,
            },
        ),
        (
            EventCategory::Trip,
            EventImpact {
                caloric_impact: 400,
                default_compensation_days: 2,
                impact_class: ImpactClass::Excess,
            },
        ),
        (
            EventCategory::Illness,
            EventImpact {
                caloric_impact: -300,
                default_compensation_days: 2,
                impact_class: ImpactClass::Deficit,
            },
        ),
        (
            EventCategory::Stress,
            EventImpact {
                caloric_impact: 200,
                default_compensation_days: 1,
                impact_class: ImpactClass::MildExcess,
            },
        ),
        (
            EventCategory::DayOff,
            EventImpact {
                caloric_impact: 300,
                default_compensation_days: 2,
                impact_class: ImpactClass::Excess,
            },
        ),
    ])
});

/// Looks up the impact entry for a canonical category name.
#[must_use]
pub fn impact_of(name: &str) -> Option<&'static EventImpact> {
    EventCategory::all()
        .into_iter()
        .find(|category| category.name() == name)
        .and_then(|category| KNOWLEDGE_BASE.get(&category))
}

/// Classifies a raw event-category string.
///
/// The input is normalized (case, diacritics, separators) before lookup.
/// This is the sole validation gate for event input: unknown categories are
/// an error, never a silent default.
pub fn classify(raw: &str) -> Result<(EventCategory, &'static EventImpact), EngineError> {
    let normalized = normalize_category(raw);
    EventCategory::all()
        .into_iter()
        .find(|category| category.name() == normalized)
        .and_then(|category| KNOWLEDGE_BASE.get(&category).map(|impact| (category, impact)))
        .ok_or(EngineError::UnknownEvent(normalized))
}
