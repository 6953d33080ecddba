//! # vidhi-lifecycle: Filing States, Deadlines and Appeals
//!
//! Tracks a generated document after it leaves the engine: whether it was
//! filed, when the authority must reply, and whether a first appeal can be
//! derived from it.
//!
//! - `state.rs`: state enum, events and the transition table.
//! - `deadline.rs`: deadlines from a submission instant and the
//!   jurisdiction's windows; urgency classification.
//! - `record.rs`: the stored record and its transition log.
//! - `store.rs`: the [`RecordStore`] seam and an in-memory implementation.
//! - `appeal.rs`: appeal eligibility and input derivation.
//! - `manager.rs`: [`LifecycleManager`], which serializes mutations per
//!   record and writes back only on success.
//!
//! State machine and deadline arithmetic live only in this crate.

pub mod appeal;
pub mod deadline;
pub mod error;
pub mod manager;
pub mod record;
pub mod state;
pub mod store;

// ─── Lifecycle re-exports ───────────────────────────────────────────

pub use deadline::{DeadlineKind, Deadlines, Urgency, URGENT_WITHIN_DAYS};
pub use error::{LifecycleError, LifecycleResult};
pub use manager::{LifecycleManager, PendingDeadline};
pub use record::DocumentRecord;
pub use state::{DocumentState, LifecycleEvent, TransitionRecord};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
