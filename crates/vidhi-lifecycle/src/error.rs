//! Lifecycle errors. A failed operation never changes the stored record.

use thiserror::Error;
use vidhi_core::{DocumentId, VidhiError};
use vidhi_engine::{EngineError, ValidationFinding};

use crate::state::{DocumentState, LifecycleEvent};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The event is not allowed from the record's effective state.
    #[error("invalid lifecycle transition: {event} from {from}")]
    InvalidTransition {
        from: DocumentState,
        event: LifecycleEvent,
    },

    /// The parent record cannot be appealed.
    #[error("document {id} is not eligible for appeal: {reason}")]
    IneligibleForAppeal { id: DocumentId, reason: String },

    /// No appeal ground is defined for the reason code.
    #[error("unknown appeal reason {0:?}")]
    UnknownAppealReason(String),

    #[error("document record {0} not found")]
    RecordNotFound(DocumentId),

    /// The record's jurisdiction is missing from the current rules.
    #[error("jurisdiction {0} is not in the loaded rules")]
    UnknownJurisdiction(String),

    #[error("document record {0} already exists")]
    DuplicateRecord(DocumentId),

    /// The derived appeal input failed validation.
    #[error("appeal generation blocked by {} finding(s)", findings.len())]
    AppealBlocked { findings: Vec<ValidationFinding> },

    #[error("record store: {0}")]
    Store(#[from] StoreError),

    /// Deadline arithmetic overflowed.
    #[error(transparent)]
    Identity(#[from] VidhiError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
