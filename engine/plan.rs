use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Day of the week. Serde keys are the lower-case English names, so a
/// deserialized plan can only ever contain the canonical seven days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

/// The canonical ordered week cycle used for schedule arithmetic.
pub const CANONICAL_WEEK: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

impl Weekday {
    /// Lower-case English name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Position in the canonical week (monday = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Parses a lower-case weekday name.
    #[must_use]
    pub fn from_name(raw: &str) -> Option<Self> {
        CANONICAL_WEEK.into_iter().find(|day| day.name() == raw)
    }
}

/// One meal slot inside a day plan.
///
/// `identifier` is assigned by the external plan store; a replacement entry
/// must keep it so persisted records reconcile. Only name, calories, and
/// category may change during substitution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealEntry {
    /// Meal name.
    pub name: String,
    /// Caloric content, non-negative.
    pub calories: f64,
    /// Dietary classification.
    pub category: String,
    /// Stable identifier assigned by the external store.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl MealEntry {
    /// Creates an entry with no store identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, calories: f64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calories,
            category: category.into(),
            identifier: None,
        }
    }

    /// Attaches a store identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

/// Weekly plan: each present day maps to its ordered meal slots
/// (breakfast, lunch, dinner on well-formed input). Only days present in
/// the map are eligible for mutation.
pub type WeekPlan = IndexMap<Weekday, Vec<MealEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_names_round_trip() {
        for day in CANONICAL_WEEK {
            assert_eq!(Weekday::from_name(day.name()), Some(day));
        }
        assert_eq!(Weekday::from_name("funday"), None);
    }

    #[test]
    fn plan_rejects_unknown_day_keys() {
        let result: Result<WeekPlan, _> =
            serde_json::from_str(r#"{ "someday": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn meal_entry_serializes_store_identifier_as_underscore_id() {
        let entry = MealEntry::new("green salad", 90.0, "detox").with_identifier("abc123");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"_id\":\"abc123\""));
        let bare = MealEntry::new("green salad", 90.0, "detox");
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("_id"));
    }
}
