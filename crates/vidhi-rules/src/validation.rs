//! # Rule Data Integrity
//!
//! Cross-table checks run before a rule set is published.
//!
//! ## Check Layers
//!
//! 1. **Required fields**: names, citations and templates are non-blank.
//! 2. **Jurisdictions**: unique payment modes, a designation for every
//!    document kind, at least one language.
//! 3. **Categories**: usable keywords, mandated clauses exist.
//! 4. **Clauses**: unique ids, known bindings, predicates that refer to
//!    loaded jurisdictions and categories, and an unconditional structural
//!    clause for every document kind.
//! 5. **Appeal grounds**: statement, grounds and prayer present.
//! 6. **Kind profiles**: one per document kind, complexity in range,
//!    usable keywords.
//!
//! Any failure in layers 1-6 is fatal and returned as a [`RuleDataError`].
//! Inconsistencies that cannot produce a wrong document are collected as
//! warnings on the [`RuleCheckReport`].

use std::collections::{BTreeMap, BTreeSet};

use vidhi_core::identity::normalize_lookup_key;
use vidhi_core::{CategoryId, DocumentKind, JurisdictionId};

use crate::appeal::AppealGround;
use crate::category::CategoryRule;
use crate::clause::{
    list_placeholder, placeholders, ClauseSpec, ClauseStage, Expansion, Predicate, BINDING_KEYS,
    LIST_BINDING_KEYS,
};
use crate::error::{RuleDataError, RuleResult};
use crate::jurisdiction::JurisdictionProfile;
use crate::kind_profile::{KindProfile, MAX_KIND_COMPLEXITY};

/// Non-fatal findings from a rule set check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleCheckReport {
    pub warnings: Vec<String>,
}

impl RuleCheckReport {
    fn warn(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

fn require_text(table: &'static str, id: &str, field: &'static str, value: &str) -> RuleResult<()> {
    if value.trim().is_empty() {
        return Err(RuleDataError::MissingField {
            table,
            id: id.to_string(),
            field,
        });
    }
    Ok(())
}

fn require_non_empty<T>(table: &'static str, id: &str, field: &'static str, values: &[T]) -> RuleResult<()> {
    if values.is_empty() {
        return Err(RuleDataError::MissingField {
            table,
            id: id.to_string(),
            field,
        });
    }
    Ok(())
}

/// Check all four tables together. `clauses` is the catalog before
/// expansion.
pub fn check_rule_tables(
    jurisdictions: &BTreeMap<JurisdictionId, JurisdictionProfile>,
    categories: &BTreeMap<CategoryId, CategoryRule>,
    clauses: &[ClauseSpec],
    grounds: &BTreeMap<String, AppealGround>,
) -> RuleResult<RuleCheckReport> {
    let mut report = RuleCheckReport::default();
    for profile in jurisdictions.values() {
        check_jurisdiction(profile)?;
    }
    let clause_ids = check_clause_ids(clauses)?;
    for rule in categories.values() {
        check_category(rule, &clause_ids, clauses, &mut report)?;
    }
    let jurisdiction_keys: BTreeSet<String> = jurisdictions.keys().map(JurisdictionId::lookup_key).collect();
    for clause in clauses {
        check_clause(clause, &jurisdiction_keys, categories, &mut report)?;
    }
    check_structural_coverage(clauses)?;
    for ground in grounds.values() {
        check_appeal_ground(ground)?;
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Jurisdictions
// ---------------------------------------------------------------------------

/// Check one jurisdiction profile.
pub fn check_jurisdiction(profile: &JurisdictionProfile) -> RuleResult<()> {
    const T: &str = "jurisdiction";
    let id = profile.id.as_str();
    require_text(T, id, "name", &profile.name)?;
    require_text(T, id, "fee_rule", &profile.fee_rule)?;
    require_text(T, id, "stamp_act", &profile.stamp_act)?;
    require_non_empty(T, id, "payment_modes", &profile.payment_modes)?;
    require_non_empty(T, id, "languages", &profile.languages)?;

    let mut seen = BTreeSet::new();
    for mode in &profile.payment_modes {
        require_text(T, id, "payment_modes", mode)?;
        if !seen.insert(mode.trim().to_lowercase()) {
            return Err(RuleDataError::Malformed {
                table: T,
                id: id.to_string(),
                detail: format!("payment mode {mode:?} listed twice"),
            });
        }
    }

    for kind in DocumentKind::ALL {
        match profile.designation_for(kind) {
            Some(d) if !d.trim().is_empty() => {}
            _ => {
                return Err(RuleDataError::Malformed {
                    table: T,
                    id: id.to_string(),
                    detail: format!("no designation for {kind}"),
                })
            }
        }
    }

    if profile.guardian_age_limit == 0 {
        return Err(RuleDataError::Malformed {
            table: T,
            id: id.to_string(),
            detail: "guardian_age_limit must be positive".to_string(),
        });
    }
    if profile.deadlines.reply_days.values().any(|d| *d == 0) {
        return Err(RuleDataError::Malformed {
            table: T,
            id: id.to_string(),
            detail: "reply window must be at least one day".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

fn check_category(
    rule: &CategoryRule,
    clause_ids: &BTreeSet<&str>,
    clauses: &[ClauseSpec],
    report: &mut RuleCheckReport,
) -> RuleResult<()> {
    const T: &str = "category";
    let id = rule.id.as_str();
    require_text(T, id, "name", &rule.name)?;
    require_text(T, id, "citation", &rule.citation)?;
    require_text(T, id, "remediation", &rule.remediation)?;
    require_non_empty(T, id, "document_kinds", &rule.document_kinds)?;
    if rule.keyword_tokens().next().is_none() {
        return Err(RuleDataError::EmptyKeywords {
            category: id.to_string(),
        });
    }
    for clause in &rule.clauses {
        if !clause_ids.contains(clause.as_str()) {
            return Err(RuleDataError::UnknownReference {
                table: T,
                id: id.to_string(),
                target: "clause",
                reference: clause.to_string(),
            });
        }
        let referenced = clauses
            .iter()
            .filter(|c| c.id == *clause)
            .any(|c| matches!(c.applies, Predicate::Referenced));
        if !referenced {
            report.warn(format!(
                "category {id:?} mandates clause {clause:?}, which is not marked `referenced`"
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

fn check_clause_ids(clauses: &[ClauseSpec]) -> RuleResult<BTreeSet<&str>> {
    let mut ids = BTreeSet::new();
    for clause in clauses {
        if clause.id.as_str().contains('@') {
            return Err(RuleDataError::Malformed {
                table: "clause",
                id: clause.id.to_string(),
                detail: "`@` is reserved for expanded clause ids".to_string(),
            });
        }
        if !ids.insert(clause.id.as_str()) {
            return Err(RuleDataError::DuplicateId {
                table: "clause",
                id: clause.id.to_string(),
            });
        }
    }
    Ok(ids)
}

fn check_clause(
    clause: &ClauseSpec,
    jurisdiction_keys: &BTreeSet<String>,
    categories: &BTreeMap<CategoryId, CategoryRule>,
    report: &mut RuleCheckReport,
) -> RuleResult<()> {
    const T: &str = "clause";
    let id = clause.id.as_str();
    require_non_empty(T, id, "kinds", &clause.kinds)?;
    require_non_empty(T, id, "template", &clause.template)?;
    require_text(T, id, "reason", &clause.reason)?;
    for paragraph in &clause.template {
        require_text(T, id, "template", paragraph)?;
    }

    check_bindings(clause)?;

    let mut failure = None;
    clause.applies.walk(&mut |p| {
        if failure.is_some() {
            return;
        }
        match p {
            Predicate::Jurisdiction { id: j } if !jurisdiction_keys.contains(&j.lookup_key()) => {
                failure = Some(("jurisdiction", j.to_string()));
            }
            Predicate::Category { id: c } if !categories.contains_key(c) => {
                failure = Some(("category", c.to_string()));
            }
            Predicate::All { of } if of.is_empty() => {
                report.warn(format!("clause {id:?} has an empty `all` predicate"));
            }
            _ => {}
        }
    });
    if let Some((target, reference)) = failure {
        return Err(RuleDataError::UnknownReference {
            table: T,
            id: id.to_string(),
            target,
            reference,
        });
    }

    if clause.expand == Expansion::PerCategory
        && !categories.values().any(|c| clause.kinds.iter().any(|k| c.applies_to(*k)))
    {
        report.warn(format!("clause {id:?} expands per category but no category applies to its kinds"));
    }
    Ok(())
}

fn check_bindings(clause: &ClauseSpec) -> RuleResult<()> {
    let id = clause.id.as_str();
    let uses_category = |key: &str| key.starts_with("category.");
    for paragraph in &clause.template {
        if list_placeholder(paragraph).is_some() {
            continue;
        }
        check_scalar_keys(clause, paragraph)?;
    }
    for text in clause.citation.iter().chain(std::iter::once(&clause.reason)) {
        check_scalar_keys(clause, text)?;
    }
    if clause.expand != Expansion::PerCategory && clause.templates().flat_map(placeholders).any(uses_category) {
        return Err(RuleDataError::Malformed {
            table: "clause",
            id: id.to_string(),
            detail: "`category.*` bindings require `expand: per_category`".to_string(),
        });
    }
    Ok(())
}

fn check_scalar_keys(clause: &ClauseSpec, text: &str) -> RuleResult<()> {
    for key in placeholders(text) {
        if LIST_BINDING_KEYS.contains(&key) {
            return Err(RuleDataError::Malformed {
                table: "clause",
                id: clause.id.to_string(),
                detail: format!("list binding {{{{{key}}}}} must be a paragraph of its own"),
            });
        }
        if !BINDING_KEYS.contains(&key) {
            return Err(RuleDataError::UnknownBinding {
                clause: clause.id.to_string(),
                binding: key.to_string(),
            });
        }
    }
    Ok(())
}

fn check_structural_coverage(clauses: &[ClauseSpec]) -> RuleResult<()> {
    for kind in DocumentKind::ALL {
        let covered = clauses.iter().any(|c| {
            c.stage == ClauseStage::Structural
                && c.applies_to(kind)
                && c.expand == Expansion::None
                && c.applies.is_unconditional()
        });
        if !covered {
            return Err(RuleDataError::Malformed {
                table: "clause catalog",
                id: kind.to_string(),
                detail: "no unconditional structural clause".to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Appeal grounds
// ---------------------------------------------------------------------------

fn check_appeal_ground(ground: &AppealGround) -> RuleResult<()> {
    const T: &str = "appeal ground";
    let id = ground.code.as_str();
    require_text(T, id, "code", &ground.code)?;
    if normalize_lookup_key(id) != id || id.contains(' ') {
        return Err(RuleDataError::Malformed {
            table: T,
            id: id.to_string(),
            detail: "reason codes are lower-case snake_case".to_string(),
        });
    }
    require_text(T, id, "label", &ground.label)?;
    require_text(T, id, "statement", &ground.statement)?;
    require_text(T, id, "prayer", &ground.prayer)?;
    require_non_empty(T, id, "grounds", &ground.grounds)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Kind profiles
// ---------------------------------------------------------------------------

/// Check the kind profiles. Every document kind needs one.
pub fn check_kind_profiles(
    kinds: &BTreeMap<DocumentKind, KindProfile>,
    report: &mut RuleCheckReport,
) -> RuleResult<()> {
    const T: &str = "document kind";
    for kind in DocumentKind::ALL {
        let Some(profile) = kinds.get(&kind) else {
            return Err(RuleDataError::Malformed {
                table: T,
                id: kind.to_string(),
                detail: "no profile for this document kind".to_string(),
            });
        };
        let id = kind.as_str();
        require_text(T, id, "purpose", &profile.purpose)?;
        require_text(T, id, "approach", &profile.approach)?;
        if !(1..=MAX_KIND_COMPLEXITY).contains(&profile.complexity) {
            return Err(RuleDataError::Malformed {
                table: T,
                id: id.to_string(),
                detail: format!("complexity {} outside 1..={MAX_KIND_COMPLEXITY}", profile.complexity),
            });
        }
        if profile.keyword_tokens().next().is_none() {
            return Err(RuleDataError::MissingField {
                table: T,
                id: id.to_string(),
                field: "keywords",
            });
        }
        let positive: BTreeSet<Vec<String>> = profile.keyword_tokens().map(|(_, t)| t).collect();
        for (phrase, tokens) in profile.negative_tokens() {
            if positive.contains(&tokens) {
                report.warn(format!("kind {id:?} lists {phrase:?} as both a keyword and a negative keyword"));
            }
        }
    }
    Ok(())
}
