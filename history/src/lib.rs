#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Event-history store collaborators for the NutriPlan adaptation engine.

/// Event records and the user-id scheme.
#[path = "../record.rs"]
pub mod record;

/// Store trait and the in-memory reference store.
#[path = "../store.rs"]
pub mod store;

/// Append-only JSON-lines store.
#[path = "../file_store.rs"]
pub mod file_store;

pub use file_store::{FileHistoryStore, HistorySnapshot};
pub use record::{EventRecord, UserId, UserIdError};
pub use store::{HistoryStore, MemoryHistoryStore};
