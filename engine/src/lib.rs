#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! NutriPlan adaptation decision engine: event classification, compensation-day
//! prediction, cyclic schedule resolution, and identity-preserving meal
//! substitution.

/// Week-plan data model (weekdays, meal entries).
#[path = "../plan.rs"]
pub mod plan;

/// Event-category input normalization (case + diacritic folding).
#[path = "../normalize.rs"]
pub mod normalize;

/// Static event knowledge base and classification.
#[path = "../knowledge.rs"]
pub mod knowledge;

/// Static meal substitution catalog.
#[path = "../catalog.rs"]
pub mod catalog;

/// Compensation-day predictor (online-retrained OLS with default fallback).
#[path = "../predictor/main.rs"]
pub mod predictor;

/// Cyclic schedule resolution.
#[path = "../schedule.rs"]
pub mod schedule;

/// Meal substitution policy.
#[path = "../substitute.rs"]
pub mod substitute;

/// Shared request/outcome types and the engine error taxonomy.
#[path = "../module.rs"]
pub mod module;

/// Telemetry helpers for logging/event emission.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Engine configuration document.
#[path = "../config.rs"]
pub mod config;

/// Plan adaptation orchestrator.
#[path = "../main.rs"]
pub mod orchestrator;

pub use catalog::{CatalogMeal, Strategy, SubstitutionCatalog};
pub use config::EngineConfig;
pub use knowledge::{classify, EventCategory, EventImpact, ImpactClass};
pub use module::{AdaptationOutcome, AdaptationRequest, AdaptationStage, EngineError};
pub use orchestrator::AdaptationEngine;
pub use plan::{MealEntry, WeekPlan, Weekday, CANONICAL_WEEK};
pub use predictor::{
    CompensationPredictor, HistoryScope, ModelPrediction, PredictError, PredictorConfig,
};
pub use telemetry::{AdaptTelemetry, AdaptTelemetryBuilder};
