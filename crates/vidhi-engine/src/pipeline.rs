//! # Document Pipeline
//!
//! [`DocumentEngine`] runs detection, validation, assembly and composition
//! for one input against one rule snapshot. The snapshot is taken once per
//! call, so a concurrent reload never mixes two rule versions inside a
//! document.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vidhi_core::{Clock, DocumentHasher, DocumentId, DocumentKind, Sha256Hasher, Timestamp};
use vidhi_rules::{RuleSet, RuleStore};

use crate::assemble::{assemble, AssemblyContext, ClauseDecision};
use crate::bindings::Bindings;
use crate::complexity::ComplexityScore;
use crate::compose::{compose, StructuredDocument};
use crate::config::EngineConfig;
use crate::detect::{detect_categories, CategoryMatch};
use crate::error::EngineResult;
use crate::explain::{explain, ExplanationReport};
use crate::input::ApplicationInput;
use crate::recommend::{recommend_kind, Recommendation};
use crate::validate::{validate, ValidationContext};
use crate::verdict::{Severity, VerdictResult};

/// Detection and validation results for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub matches: BTreeSet<CategoryMatch>,
    pub result: VerdictResult,
    pub complexity: ComplexityScore,
}

/// A successfully generated document with everything that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub id: DocumentId,
    pub generated_at: Timestamp,
    /// The input, with the jurisdiction in its canonical spelling.
    pub input: ApplicationInput,
    pub matches: BTreeSet<CategoryMatch>,
    pub result: VerdictResult,
    pub decisions: Vec<ClauseDecision>,
    pub document: StructuredDocument,
    /// Digest of the rule tables the document was generated from.
    pub rules_digest: String,
}

impl GeneratedDocument {
    pub fn explanation(&self) -> ExplanationReport {
        explain(&self.result, &self.decisions)
    }
}

/// Result of [`DocumentEngine::generate`].
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Validation blocked generation. Nothing was composed.
    Blocked(Assessment),
    Generated(Box<GeneratedDocument>),
}

impl GenerationOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    pub fn into_generated(self) -> Option<GeneratedDocument> {
        match self {
            Self::Generated(doc) => Some(*doc),
            Self::Blocked(_) => None,
        }
    }
}

/// The document pipeline with its collaborators.
#[derive(Clone)]
pub struct DocumentEngine {
    rules: Arc<RuleStore>,
    clock: Arc<dyn Clock>,
    hasher: Arc<dyn DocumentHasher>,
    config: EngineConfig,
}

impl std::fmt::Debug for DocumentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentEngine")
            .field("rules", &self.rules.snapshot().digest().to_string())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DocumentEngine {
    /// An engine with the default hasher and configuration.
    pub fn new(rules: Arc<RuleStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules,
            clock,
            hasher: Arc::new(Sha256Hasher),
            config: EngineConfig::default(),
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn DocumentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &Arc<RuleStore> {
        &self.rules
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Detect categories of `kind` in `text` against the current rules.
    pub fn detect(&self, text: &str, kind: DocumentKind) -> BTreeSet<CategoryMatch> {
        detect_categories(&self.rules.snapshot(), text, kind)
    }

    /// Suggest which kind of document fits a description of the need.
    pub fn recommend(&self, description: &str) -> Recommendation {
        recommend_kind(&self.rules.snapshot(), description)
    }

    /// Detect and validate without generating.
    pub fn validate(&self, input: &ApplicationInput) -> Assessment {
        let rules = self.rules.snapshot();
        self.assess(&rules, input)
    }

    fn assess(&self, rules: &RuleSet, input: &ApplicationInput) -> Assessment {
        let matches = detect_categories(rules, &input.free_text(), input.kind);
        let profile = rules.jurisdiction(&input.jurisdiction);
        let result = validate(&ValidationContext {
            input,
            profile,
            matches: &matches,
            rules,
            today: self.clock.today(),
            config: &self.config,
        });
        let complexity =
            ComplexityScore::compute(rules.kind_profile(input.kind), profile.is_some(), &matches, &result);
        Assessment {
            matches,
            result,
            complexity,
        }
    }

    /// Run the full pipeline. A blocked input yields
    /// [`GenerationOutcome::Blocked`]; errors are reserved for failures
    /// of the canonicalization or hashing collaborators.
    pub fn generate(&self, input: &ApplicationInput) -> EngineResult<GenerationOutcome> {
        let rules = self.rules.snapshot();
        let assessment = self.assess(&rules, input);
        let profile = match rules.jurisdiction(&input.jurisdiction) {
            Some(profile) if !assessment.result.is_blocked() => profile,
            _ => {
                let rule_ids: Vec<&str> = assessment
                    .result
                    .with_severity(Severity::Block)
                    .map(|f| f.rule_id.as_str())
                    .collect();
                tracing::warn!(kind = %input.kind, findings = ?rule_ids, "generation blocked");
                metrics::counter!("vidhi_documents_blocked_total", "kind" => input.kind.as_str()).increment(1);
                return Ok(GenerationOutcome::Blocked(assessment));
            }
        };

        let mut normalized = input.clone();
        normalized.jurisdiction = profile.id.to_string();

        let bindings = Bindings::build(&normalized, profile, &rules, &self.config);
        let decisions = assemble(&AssemblyContext {
            input: &normalized,
            profile,
            rules: &rules,
            matches: &assessment.matches,
            findings: &assessment.result.findings,
            bindings: &bindings,
        });
        let document = compose(&normalized, profile, &decisions, &self.config);

        let generated_at = self.clock.now();
        let id = self.hasher.identify(&document.canonical_bytes()?, generated_at)?;

        tracing::debug!(
            document = %id,
            kind = %normalized.kind,
            jurisdiction = %profile.id,
            clauses = decisions.len(),
            complexity = assessment.complexity.total,
            verdict = %assessment.result.verdict,
            "document generated"
        );
        metrics::counter!(
            "vidhi_documents_generated_total",
            "kind" => normalized.kind.as_str(),
            "verdict" => assessment.result.verdict.as_str()
        )
        .increment(1);

        Ok(GenerationOutcome::Generated(Box::new(GeneratedDocument {
            id,
            generated_at,
            input: normalized,
            matches: assessment.matches,
            result: assessment.result,
            decisions,
            document,
            rules_digest: rules.digest().to_string(),
        })))
    }
}
