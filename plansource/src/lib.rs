#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! External collaborators of the adaptation engine: user-profile lookup and
//! candidate-meal sampling from an external plan service. Fully outside the
//! decision core; every implementation here may be replaced by a stub.

/// User-profile classification lookup.
#[path = "../profile.rs"]
pub mod profile;

/// Candidate-meal sampling.
#[path = "../source.rs"]
pub mod source;

pub use profile::{HttpProfileLookup, ProfileLookup, ProfileTag, StaticProfileLookup};
pub use source::{HttpPlanSource, PlanSource, SampledMeal, StaticPlanSource};
