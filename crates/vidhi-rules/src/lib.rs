//! # vidhi-rules: Rule Repository
//!
//! Loads and serves the data that drives document generation. No legal
//! requirement lives in engine code; it lives here, in five tables:
//!
//! - **Jurisdictions** (`jurisdiction.rs`): fees, payment modes, stamp
//!   values, designations, languages, attestation format, deadline windows.
//!
//! - **Categories** (`category.rs`): regulatory classifications with their
//!   keywords, citation, severity and mandated clauses.
//!
//! - **Clauses** (`clause.rs`): the clause catalog with applicability
//!   predicates and `{{key}}` templates.
//!
//! - **Appeal grounds** (`appeal.rs`): grievance text per appeal reason.
//!
//! - **Document kinds** (`kind_profile.rs`): base complexity and the
//!   keyword tables that suggest a kind from a description of the need.
//!
//! ## Loading
//!
//! Tables come from a [`RuleSource`]: the embedded defaults or a directory of
//! YAML/JSON files. [`RuleSet::load`] parses, checks (`validation.rs`) and
//! expands them; [`RuleStore`] publishes a snapshot and swaps it atomically
//! on reload. Malformed data is rejected at load time, never at generation
//! time.

pub mod appeal;
pub mod category;
pub mod clause;
pub mod error;
pub mod jurisdiction;
pub mod kind_profile;
pub mod parser;
pub mod repository;
pub mod source;
pub mod validation;

// ─── Table re-exports ───────────────────────────────────────────────

pub use appeal::{AppealGround, AppealTrigger};
pub use category::{tokenize, CategoryRule, CategorySeverity};
pub use clause::{
    render, ClauseSpec, ClauseStage, Expansion, Predicate, SectionKind, BINDING_KEYS,
    LIST_BINDING_KEYS, UNBOUND_PLACEHOLDER,
};
pub use jurisdiction::{
    DeadlineWindows, JurisdictionProfile, NotarizationFormat, DEFAULT_GUARDIAN_AGE_LIMIT,
    STATUTORY_APPEAL_FILING_DAYS, STATUTORY_REPLY_DAYS,
};
pub use kind_profile::{KindProfile, MAX_KIND_COMPLEXITY};

// ─── Repository re-exports ──────────────────────────────────────────

pub use error::{RuleDataError, RuleResult};
pub use repository::{RuleSet, RuleStore};
pub use source::{export_embedded, DirectorySource, EmbeddedSource, RuleSource};
pub use validation::RuleCheckReport;
