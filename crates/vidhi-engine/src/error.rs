//! Engine errors.
//!
//! Blocked inputs are not errors: they come back as
//! [`GenerationOutcome::Blocked`](crate::pipeline::GenerationOutcome) with
//! their findings. These variants cover failures after a document was
//! composed.

use thiserror::Error;
use vidhi_core::{CanonicalizationError, VidhiError};

#[derive(Error, Debug)]
pub enum EngineError {
    /// The composed document could not be canonicalized.
    #[error("document canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The hashing collaborator could not identify the document.
    #[error("document identification failed: {0}")]
    Identity(#[from] VidhiError),
}

pub type EngineResult<T> = Result<T, EngineError>;
