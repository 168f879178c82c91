use std::sync::Arc;

use serde_json::json;
use shared_logging::LogLevel;

use nutriplan_history::{EventRecord, HistoryStore, UserId};

use crate::{
    catalog::SubstitutionCatalog,
    config::EngineConfig,
    knowledge::classify,
    module::{AdaptationOutcome, AdaptationRequest, AdaptationStage, EngineError},
    predictor::{CompensationPredictor, PredictError},
    schedule,
    substitute::substitute,
    telemetry::AdaptTelemetry,
};

/// Plan adaptation orchestrator.
///
/// Stateless between calls except for the externally owned history store:
/// one read before prediction, one append after substitution. Rejections
/// happen before any mutation or history write, so a failed request is
/// all-or-nothing from the caller's perspective.
pub struct AdaptationEngine {
    predictor: CompensationPredictor,
    catalog: SubstitutionCatalog,
    store: Arc<dyn HistoryStore>,
    telemetry: Option<AdaptTelemetry>,
    preserve_identity: bool,
}

impl AdaptationEngine {
    /// Creates an engine from a configuration document and a history store.
    #[must_use]
    pub fn new(config: &EngineConfig, store: Arc<dyn HistoryStore>) -> Self {
        Self {
            predictor: CompensationPredictor::new(config.predictor_config()),
            catalog: config.build_catalog(),
            store,
            telemetry: None,
            preserve_identity: config.substitution.preserve_identity,
        }
    }

    /// Injects telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: AdaptTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Replaces the substitution catalog (e.g. after sampling an external
    /// plan source).
    #[must_use]
    pub fn with_catalog(mut self, catalog: SubstitutionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Runs one adaptation request end to end.
    pub fn adapt(&self, request: &AdaptationRequest) -> Result<AdaptationOutcome, EngineError> {
        self.stage(AdaptationStage::Received, json!({ "event": request.event_category }));

        let user_id = match UserId::parse(&request.user_id) {
            Ok(user_id) => user_id,
            Err(err) => return Err(self.reject(EngineError::Validation(err.to_string()))),
        };
        if request.plan.is_empty() {
            return Err(self.reject(EngineError::Validation("plan has no days".into())));
        }

        let (category, impact) = match classify(&request.event_category) {
            Ok(found) => found,
            Err(err) => return Err(self.reject(err)),
        };
        self.stage(
            AdaptationStage::Classified,
            json!({
                "category": category.name(),
                "caloric_impact": impact.caloric_impact,
                "class": impact.impact_class,
            }),
        );

        let mut warnings = Vec::new();
        let (days, model_used) = match self.store.query_all() {
            Ok(records) => {
                match self
                    .predictor
                    .predict(impact.caloric_impact, &records, Some(&user_id))
                {
                    Ok(prediction) => {
                        self.event(
                            "predictor.model_fit",
                            json!({
                                "samples": prediction.samples,
                                "slope": prediction.slope,
                                "intercept": prediction.intercept,
                                "retired_skipped": prediction.retired_skipped,
                            }),
                        );
                        (prediction.days, true)
                    }
                    Err(PredictError::InsufficientHistory { samples, required }) => {
                        self.log(
                            LogLevel::Debug,
                            "predictor.fallback_to_default",
                            json!({ "samples": samples, "required": required }),
                        );
                        (impact.default_compensation_days, false)
                    }
                }
            }
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "adapt.history_read_failed",
                    json!({ "error": err.to_string() }),
                );
                warnings.push(format!("history unavailable, used default days: {err}"));
                (impact.default_compensation_days, false)
            }
        };
        self.stage(
            AdaptationStage::DaysResolved,
            json!({ "days": days, "model_used": model_used }),
        );

        let anchor = request.anchor_day.trim().to_lowercase();
        let target_days = schedule::resolve(&anchor, days);
        self.stage(
            AdaptationStage::DaysScheduled,
            json!({ "targets": target_days.iter().map(|day| day.name()).collect::<Vec<_>>() }),
        );

        let report = substitute(
            &request.plan,
            &target_days,
            impact.impact_class,
            &self.catalog,
            self.preserve_identity,
        );
        warnings.extend(report.warnings);
        self.stage(
            AdaptationStage::Substituted,
            json!({ "touched": report.touched.len() }),
        );

        let record = EventRecord::new(user_id.clone(), category.name(), anchor, days);
        let record_id = record.id;
        let record_id = match self.store.append(record) {
            Ok(()) => {
                self.stage(AdaptationStage::Recorded, json!({ "record_id": record_id }));
                Some(record_id)
            }
            Err(err) => {
                // The computed plan is still the request's result; only
                // future training loses this record.
                self.log(
                    LogLevel::Error,
                    "adapt.history_append_failed",
                    json!({ "error": err.to_string() }),
                );
                warnings.push(format!("event record not persisted: {err}"));
                None
            }
        };

        let message = format!(
            "Plan adjusted for '{}' ({} compensation {})",
            category.name(),
            days,
            if days == 1 { "day" } else { "days" }
        );
        self.event(
            "adapt.plan_adjusted",
            json!({
                "user": user_id.as_str(),
                "category": category.name(),
                "days": days,
                "model_used": model_used,
                "touched": report.touched.len(),
            }),
        );
        self.stage(AdaptationStage::Done, json!({}));

        Ok(AdaptationOutcome {
            message,
            plan: report.plan,
            event_category: category,
            impact_class: impact.impact_class,
            compensation_days: days,
            target_days,
            model_used,
            record_id,
            warnings,
        })
    }

    fn reject(&self, err: EngineError) -> EngineError {
        let _ = self.telemetry.as_ref().map(|tel| {
            tel.stage(
                AdaptationStage::Rejected,
                json!({ "reason": err.to_string() }),
            )
        });
        err
    }

    fn stage(&self, stage: AdaptationStage, fields: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.stage(stage, fields);
        }
    }

    fn log(&self, level: LogLevel, message: &str, fields: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, fields);
        }
    }

    fn event(&self, topic: &str, payload: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.event(topic, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::Strategy,
        plan::{MealEntry, WeekPlan, Weekday, CANONICAL_WEEK},
        substitute::SLOTS_PER_DAY,
    };
    use anyhow::anyhow;
    use nutriplan_history::MemoryHistoryStore;

    const USER: &str = "64a1f0b2c3d4e5f601234567";

    fn full_week_plan() -> WeekPlan {
        CANONICAL_WEEK
            .into_iter()
            .map(|day| {
                let meals = (0..SLOTS_PER_DAY)
                    .map(|slot| {
                        MealEntry::new(format!("{}-meal-{slot}", day.name()), 500.0, "regular")
                            .with_identifier(format!("{}-id-{slot}", day.name()))
                    })
                    .collect();
                (day, meals)
            })
            .collect()
    }

    fn request(event: &str, day: &str) -> AdaptationRequest {
        AdaptationRequest {
            user_id: USER.into(),
            event_category: event.into(),
            anchor_day: day.into(),
            plan: full_week_plan(),
        }
    }

    #[test]
    fn party_on_monday_with_empty_history_uses_the_default() {
        let store = Arc::new(MemoryHistoryStore::default());
        let engine = AdaptationEngine::new(&EngineConfig::default(), store.clone());
        let outcome = engine.adapt(&request("party", "monday")).unwrap();

        assert!(!outcome.model_used);
        assert_eq!(outcome.compensation_days, 3);
        assert_eq!(
            outcome.target_days,
            vec![Weekday::Tuesday, Weekday::Wednesday, Weekday::Thursday]
        );
        assert!(outcome.message.contains("party"));
        assert!(outcome.warnings.is_empty());
        assert!(outcome.record_id.is_some());

        let catalog = SubstitutionCatalog::default();
        let light: Vec<&str> = catalog
            .pool(Strategy::Light)
            .iter()
            .map(|meal| meal.name.as_str())
            .collect();
        let original = full_week_plan();
        for day in CANONICAL_WEEK {
            let entries = &outcome.plan[&day];
            assert_eq!(entries.len(), SLOTS_PER_DAY);
            if outcome.target_days.contains(&day) {
                for (slot, entry) in entries.iter().enumerate() {
                    assert!(light.contains(&entry.name.as_str()));
                    assert_eq!(
                        entry.identifier.as_deref(),
                        Some(&*format!("{}-id-{slot}", day.name()))
                    );
                }
            } else {
                assert_eq!(entries, &original[&day]);
            }
        }

        let records = store.query_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_category, "party");
        assert_eq!(records[0].compensation_days, 3);
        assert_eq!(records[0].anchor_day, "monday");
    }

    #[test]
    fn enough_history_switches_to_the_model() {
        let store = Arc::new(MemoryHistoryStore::default());
        let owner = UserId::parse(USER).unwrap();
        for (category, days) in [("stress", 1), ("trip", 2), ("party", 3)] {
            store
                .append(EventRecord::new(owner.clone(), category, "monday", days))
                .unwrap();
        }
        let engine = AdaptationEngine::new(&EngineConfig::default(), store.clone());
        let outcome = engine.adapt(&request("day-off", "friday")).unwrap();
        assert!(outcome.model_used);
        // The seeded history lies on days = impact / 200; day-off is 300.
        assert_eq!(outcome.compensation_days, 2);
        assert_eq!(store.query_all().unwrap().len(), 4);
    }

    #[test]
    fn unknown_event_is_rejected_without_side_effects() {
        let store = Arc::new(MemoryHistoryStore::default());
        let engine = AdaptationEngine::new(&EngineConfig::default(), store.clone());
        let err = engine.adapt(&request("marathon", "monday")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownEvent(_)));
        assert!(store.query_all().unwrap().is_empty());
    }

    #[test]
    fn invalid_user_id_is_rejected() {
        let store = Arc::new(MemoryHistoryStore::default());
        let engine = AdaptationEngine::new(&EngineConfig::default(), store.clone());
        let mut bad = request("party", "monday");
        bad.user_id = "not-an-object-id".into();
        let err = engine.adapt(&bad).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(store.query_all().unwrap().is_empty());
    }

    #[test]
    fn empty_plan_is_rejected() {
        let store = Arc::new(MemoryHistoryStore::default());
        let engine = AdaptationEngine::new(&EngineConfig::default(), store.clone());
        let mut bad = request("party", "monday");
        bad.plan = WeekPlan::new();
        let err = engine.adapt(&bad).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(store.query_all().unwrap().is_empty());
    }

    struct AppendFailingStore;

    impl HistoryStore for AppendFailingStore {
        fn append(&self, _record: EventRecord) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }

        fn query_all(&self) -> anyhow::Result<Vec<EventRecord>> {
            Ok(Vec::new())
        }

        fn reset_user(&self, _user: &UserId) -> anyhow::Result<usize> {
            Ok(0)
        }

        fn reset_all(&self) -> anyhow::Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn append_failure_still_returns_the_adapted_plan() {
        let engine =
            AdaptationEngine::new(&EngineConfig::default(), Arc::new(AppendFailingStore));
        let outcome = engine.adapt(&request("stress", "sunday")).unwrap();
        assert_eq!(outcome.compensation_days, 1);
        assert_eq!(outcome.target_days, vec![Weekday::Monday]);
        assert!(outcome.record_id.is_none());
        assert!(outcome
            .warnings
            .iter()
            .any(|warning| warning.contains("not persisted")));
    }

    struct ReadFailingStore;

    impl HistoryStore for ReadFailingStore {
        fn append(&self, _record: EventRecord) -> anyhow::Result<()> {
            Ok(())
        }

        fn query_all(&self) -> anyhow::Result<Vec<EventRecord>> {
            Err(anyhow!("connection refused"))
        }

        fn reset_user(&self, _user: &UserId) -> anyhow::Result<usize> {
            Ok(0)
        }

        fn reset_all(&self) -> anyhow::Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn unreadable_history_falls_back_to_the_default() {
        let engine =
            AdaptationEngine::new(&EngineConfig::default(), Arc::new(ReadFailingStore));
        let outcome = engine.adapt(&request("trip", "wednesday")).unwrap();
        assert!(!outcome.model_used);
        assert_eq!(outcome.compensation_days, 2);
        assert!(outcome
            .warnings
            .iter()
            .any(|warning| warning.contains("history unavailable")));
    }
}
