//! # vidhi-engine: Document Pipeline
//!
//! Turns one [`ApplicationInput`] into a verdict and, unless blocked, a
//! composed document with a clause-by-clause explanation.
//!
//! ## Pipeline
//!
//! 1. **Detect** (`detect.rs`): regulatory categories in the free text.
//! 2. **Validate** (`validate.rs`): ordered checks producing findings and a
//!    verdict. A `BLOCKED` verdict stops here.
//! 3. **Assemble** (`assemble.rs`): applicable clauses in stage order,
//!    rendered from bindings (`bindings.rs`), each with its trigger,
//!    reason and citation.
//! 4. **Compose** (`compose.rs`): sections in layout order, canonical bytes,
//!    document identifier.
//!
//! [`DocumentEngine`] runs the steps against a single rule snapshot.
//! `explain.rs` prints the decision list as a report. Every assessment
//! carries a complexity score (`complexity.rs`).
//!
//! Before an input exists, `recommend.rs` suggests a document kind from a
//! free-text description of the need.

pub mod assemble;
pub mod bindings;
pub mod complexity;
pub mod compose;
pub mod config;
pub mod detect;
pub mod error;
pub mod explain;
pub mod input;
pub mod pipeline;
pub mod recommend;
pub mod validate;
pub mod verdict;

// ─── Pipeline re-exports ────────────────────────────────────────────

pub use assemble::{assemble, AssemblyContext, ClauseDecision, DecisionReason};
pub use complexity::{ComplexityLevel, ComplexityScore};
pub use compose::{compose, Section, StructuredDocument};
pub use detect::{detect_categories, CategoryMatch};
pub use explain::{explain, ExplanationEntry, ExplanationReport};
pub use pipeline::{Assessment, DocumentEngine, GeneratedDocument, GenerationOutcome};
pub use recommend::{recommend_kind, ClarificationOption, KindScore, Recommendation, RecommendationStatus};
pub use validate::{validate, ValidationContext};

// ─── Input and result re-exports ────────────────────────────────────

pub use config::{EngineConfig, DEFAULT_STALENESS_DAYS};
pub use error::{EngineError, EngineResult};
pub use input::{AppealContext, ApplicationInput, Authority, Gender, Guardian, Party};
pub use verdict::{FindingClass, Severity, ValidationFinding, Verdict, VerdictResult};
