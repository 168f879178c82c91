use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    knowledge::{EventCategory, ImpactClass},
    plan::{WeekPlan, Weekday},
};

/// Errors surfaced by the adaptation engine.
///
/// Insufficient history is deliberately absent: it is an internal fallback
/// signal (see [`crate::predictor::PredictError`]), never a request failure.
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// Missing or malformed input; nothing was mutated.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Event category not present in the knowledge base.
    #[error("unknown event category '{0}'")]
    UnknownEvent(String),
    /// History store collaborator failure.
    #[error("history store failure: {0}")]
    Store(String),
    /// Catch-all for internal issues.
    #[error("internal engine error: {0}")]
    Internal(String),
}

/// Adaptation request as received from the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptationRequest {
    /// Opaque user identifier (external store object-id scheme).
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Raw event-category string; normalized before lookup.
    #[serde(rename = "eventType")]
    pub event_category: String,
    /// Weekday the event occurred on.
    #[serde(rename = "day")]
    pub anchor_day: String,
    /// Current weekly plan.
    pub plan: WeekPlan,
}

/// Stages of one adaptation request. Any stage can transition to
/// [`AdaptationStage::Rejected`] before the plan is mutated or history
/// is written.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationStage {
    /// Request received, not yet validated.
    Received,
    /// Event classified against the knowledge base.
    Classified,
    /// Compensation-day count settled (model or default).
    DaysResolved,
    /// Target calendar days enumerated.
    DaysScheduled,
    /// Meals substituted on the target days.
    Substituted,
    /// Event record appended to history.
    Recorded,
    /// Outcome returned to the caller.
    Done,
    /// Request rejected without side effects.
    Rejected,
}

impl AdaptationStage {
    /// Stage name used in telemetry.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::DaysResolved => "days_resolved",
            Self::DaysScheduled => "days_scheduled",
            Self::Substituted => "substituted",
            Self::Recorded => "recorded",
            Self::Done => "done",
            Self::Rejected => "rejected",
        }
    }
}

/// Successful adaptation result.
#[derive(Debug, Clone, Serialize)]
pub struct AdaptationOutcome {
    /// Short human-readable summary.
    pub message: String,
    /// Mutated plan.
    #[serde(rename = "updatedPlan")]
    pub plan: WeekPlan,
    /// Classified event category.
    pub event_category: EventCategory,
    /// Impact class that selected the substitution pool.
    pub impact_class: ImpactClass,
    /// Compensation days applied.
    pub compensation_days: u32,
    /// Calendar days targeted, in cyclic order (may repeat when the count
    /// exceeds one week).
    pub target_days: Vec<Weekday>,
    /// True when the day count came from the trained model rather than the
    /// knowledge-base default.
    pub model_used: bool,
    /// Identifier of the history record written for this adaptation, when
    /// the append succeeded.
    pub record_id: Option<Uuid>,
    /// Recoverable warnings gathered along the way.
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_transport_field_names() {
        let raw = r#"{
            "userId": "64a1f0b2c3d4e5f601234567",
            "eventType": "party",
            "day": "monday",
            "plan": { "monday": [] }
        }"#;
        let request: AdaptationRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.event_category, "party");
        assert_eq!(request.anchor_day, "monday");
        assert_eq!(request.plan.len(), 1);
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(AdaptationStage::DaysResolved.name(), "days_resolved");
        assert_eq!(AdaptationStage::Rejected.name(), "rejected");
    }
}
