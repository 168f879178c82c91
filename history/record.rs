use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error raised when a user identifier fails the store's ID scheme.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserIdError {
    /// The identifier is empty.
    #[error("user id is empty")]
    Empty,
    /// The identifier has the wrong length or alphabet.
    #[error("user id '{0}' is not a 24-character hex object id")]
    Malformed(String),
}

/// Opaque user identifier following the external store's object-id scheme:
/// exactly 24 hexadecimal characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validates and normalizes a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, UserIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }
        if trimmed.len() != 24 || !trimmed.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(UserIdError::Malformed(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = UserIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

/// One adaptation decision, appended after every successful request.
/// Immutable once written; removed only by an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Normalized event category that triggered the adaptation.
    pub event_category: String,
    /// Weekday the event occurred on, as received.
    pub anchor_day: String,
    /// Number of compensation days actually applied.
    pub compensation_days: u32,
    /// Timestamp of the adaptation.
    pub recorded_at: DateTime<Utc>,
}

impl EventRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        user_id: UserId,
        event_category: impl Into<String>,
        anchor_day: impl Into<String>,
        compensation_days: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_category: event_category.into(),
            anchor_day: anchor_day.into(),
            compensation_days,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_object_id_shaped_identifiers() {
        let id = UserId::parse("64a1f0b2c3d4e5f601234567").unwrap();
        assert_eq!(id.as_str(), "64a1f0b2c3d4e5f601234567");
    }

    #[test]
    fn normalizes_case() {
        let id = UserId::parse("64A1F0B2C3D4E5F601234567").unwrap();
        assert_eq!(id.as_str(), "64a1f0b2c3d4e5f601234567");
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert_eq!(UserId::parse("  "), Err(UserIdError::Empty));
        assert!(matches!(
            UserId::parse("not-hex"),
            Err(UserIdError::Malformed(_))
        ));
        assert!(matches!(
            UserId::parse("64a1f0b2c3d4e5f60123456"),
            Err(UserIdError::Malformed(_))
        ));
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = EventRecord::new(
            UserId::parse("64a1f0b2c3d4e5f601234567").unwrap(),
            "party",
            "monday",
            3,
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_category, "party");
        assert_eq!(back.compensation_days, 3);
    }
}
