//! Compensation-day prediction from accumulated event history.
//!
//! The model is transient: it is refit from the history snapshot on every
//! prediction request and owns no state beyond the call. Snapshots may be
//! stale under concurrent appends; the model is advisory, so that is
//! acceptable.

/// Ordinary least-squares fitting.
pub mod ols;

use nutriplan_history::{EventRecord, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knowledge::impact_of;
use ols::fit_line;

/// Whether training samples are drawn from all users or one user.
///
/// The original service variants disagreed on this; it is an explicit
/// configuration choice here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryScope {
    /// Train on every user's records.
    #[default]
    Global,
    /// Train only on the requesting user's records.
    PerUser,
}

/// Predictor tuning knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Sample scoping policy.
    pub scope: HistoryScope,
    /// Minimum usable samples before a model is fit.
    pub min_samples: usize,
    /// Lower bound on predicted days. The fallback default is always >= 1,
    /// so predictions never drop below it either.
    pub floor_days: u32,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            scope: HistoryScope::Global,
            min_samples: 3,
            floor_days: 1,
        }
    }
}

/// Successful model-based prediction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelPrediction {
    /// Predicted compensation days, floored.
    pub days: u32,
    /// Usable samples the line was fit over.
    pub samples: usize,
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Historical records referencing retired categories, skipped defensively.
    pub retired_skipped: usize,
}

/// Signal that no model could be fit. Not a request failure: the caller
/// falls back to the knowledge-base default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictError {
    /// Fewer usable samples than the configured minimum.
    #[error("insufficient history: {samples} usable sample(s), need {required}")]
    InsufficientHistory {
        /// Usable samples found.
        samples: usize,
        /// Samples required.
        required: usize,
    },
}

/// Online-retrained single-feature predictor.
#[derive(Debug, Clone, Default)]
pub struct CompensationPredictor {
    config: PredictorConfig,
}

impl CompensationPredictor {
    /// Creates a predictor with the given configuration.
    #[must_use]
    pub const fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Predicts compensation days for `caloric_impact` from `history`.
    ///
    /// Records referencing categories no longer in the knowledge base are
    /// skipped and counted. Under [`HistoryScope::PerUser`], records of other
    /// users are ignored; without a scope user the filter degrades to global.
    pub fn predict(
        &self,
        caloric_impact: i32,
        history: &[EventRecord],
        scope_user: Option<&UserId>,
    ) -> Result<ModelPrediction, PredictError> {
        let mut samples = Vec::with_capacity(history.len());
        let mut retired_skipped = 0;
        for record in history {
            if self.config.scope == HistoryScope::PerUser {
                if let Some(user) = scope_user {
                    if &record.user_id != user {
                        continue;
                    }
                }
            }
            match impact_of(&record.event_category) {
                Some(impact) => samples.push((
                    f64::from(impact.caloric_impact),
                    f64::from(record.compensation_days),
                )),
                None => retired_skipped += 1,
            }
        }
        if samples.len() < self.config.min_samples {
            return Err(PredictError::InsufficientHistory {
                samples: samples.len(),
                required: self.config.min_samples,
            });
        }
        let line = fit_line(&samples).ok_or(PredictError::InsufficientHistory {
            samples: 0,
            required: self.config.min_samples,
        })?;
        let raw = line.at(f64::from(caloric_impact));
        let floored = raw.round().max(f64::from(self.config.floor_days));
        Ok(ModelPrediction {
            days: floored as u32,
            samples: samples.len(),
            slope: line.slope,
            intercept: line.intercept,
            retired_skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(tail: char) -> UserId {
        UserId::parse(&format!("64a1f0b2c3d4e5f60123456{tail}")).unwrap()
    }

    fn record(owner: &UserId, category: &str, days: u32) -> EventRecord {
        EventRecord::new(owner.clone(), category, "monday", days)
    }

    #[test]
    fn small_history_signals_fallback() {
        let predictor = CompensationPredictor::default();
        let owner = user('1');
        for count in 0..3 {
            let history: Vec<EventRecord> = (0..count)
                .map(|_| record(&owner, "party", 3))
                .collect();
            let result = predictor.predict(600, &history, None);
            assert_eq!(
                result,
                Err(PredictError::InsufficientHistory {
                    samples: count,
                    required: 3
                })
            );
        }
    }

    #[test]
    fn fits_and_floors_to_at_least_one_day() {
        let predictor = CompensationPredictor::default();
        let owner = user('1');
        let history = vec![
            record(&owner, "stress", 1),
            record(&owner, "trip", 2),
            record(&owner, "party", 3),
        ];
        let prediction = predictor.predict(300, &history, None).unwrap();
        assert_eq!(prediction.days, 2);
        assert_eq!(prediction.samples, 3);

        // Far below any observed impact the raw line would go under one day.
        let prediction = predictor.predict(-2000, &history, None).unwrap();
        assert!(prediction.days >= 1);
    }

    #[test]
    fn retired_categories_are_skipped_not_fatal() {
        let predictor = CompensationPredictor::default();
        let owner = user('1');
        let history = vec![
            record(&owner, "stress", 1),
            record(&owner, "trip", 2),
            record(&owner, "party", 3),
            record(&owner, "cheat-weekend", 5),
        ];
        let prediction = predictor.predict(600, &history, None).unwrap();
        assert_eq!(prediction.samples, 3);
        assert_eq!(prediction.retired_skipped, 1);
    }

    #[test]
    fn per_user_scope_ignores_other_users() {
        let predictor = CompensationPredictor::new(PredictorConfig {
            scope: HistoryScope::PerUser,
            ..PredictorConfig::default()
        });
        let mine = user('1');
        let theirs = user('2');
        let history = vec![
            record(&mine, "stress", 1),
            record(&mine, "trip", 2),
            record(&theirs, "party", 3),
        ];
        let result = predictor.predict(600, &history, Some(&mine));
        assert_eq!(
            result,
            Err(PredictError::InsufficientHistory {
                samples: 2,
                required: 3
            })
        );

        let global = CompensationPredictor::default();
        assert!(global.predict(600, &history, Some(&mine)).is_ok());
    }
}
