//! # vidhi-core: Foundational Types for the Vidhi Document Engine
//!
//! This crate is the leaf of the Vidhi workspace. It defines the primitives
//! every other crate agrees on: which documents exist, how identifiers are
//! spelled, how time is read, and how a composed document is turned into a
//! stable identifier.
//!
//! ## Key Design Principles
//!
//! 1. **Closed document kinds.** `DocumentKind` is a single enum. Adding a
//!    kind forces every `match` in the workspace to handle it.
//!
//! 2. **Newtype identifiers.** `JurisdictionId`, `CategoryId`, `ClauseId`
//!    and `DocumentId` are distinct types. No bare strings cross crate
//!    boundaries as identifiers.
//!
//! 3. **Injected time.** Nothing in the engine calls `Utc::now()` directly.
//!    Callers hand in a [`Clock`]; tests hand in a [`FixedClock`] or
//!    [`ManualClock`].
//!
//! 4. **Canonical bytes before hashing.** Document identifiers are derived
//!    through [`CanonicalBytes`] only, so two structurally equal documents
//!    always hash identically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vidhi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DocumentHasher, Sha256Hasher};
pub use domain::DocumentKind;
pub use error::{CanonicalizationError, VidhiError};
pub use identity::{CategoryId, ClauseId, DocumentId, JurisdictionId};
pub use temporal::{Clock, FixedClock, ManualClock, SystemClock, Timestamp, SECONDS_PER_DAY};
