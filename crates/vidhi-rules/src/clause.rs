//! # Clause Catalog
//!
//! A [`ClauseSpec`] is one unit of document content: the section it lands
//! in, the paragraphs it renders, the predicate that decides whether it
//! applies, and the citation and reason reported when it does.
//!
//! ## Templates
//!
//! Paragraphs, citations and reasons use `{{key}}` placeholders. The set of
//! keys is closed ([`BINDING_KEYS`]) and checked when rule data is loaded,
//! so a typo in a template is a load failure, not a blank in a filed
//! document. A paragraph consisting of exactly one list key
//! ([`LIST_BINDING_KEYS`]) expands into one paragraph per list item.
//!
//! ## Expansion
//!
//! `expand: per_jurisdiction` turns one spec into one spec per loaded
//! profile, each guarded by a jurisdiction predicate. Alternative fee
//! clauses are therefore mutually exclusive by construction: exactly one
//! jurisdiction predicate can hold. `expand: per_category` does the same
//! for categories.

use serde::{Deserialize, Serialize};
use vidhi_core::{CategoryId, ClauseId, DocumentKind, JurisdictionId};

use crate::jurisdiction::NotarizationFormat;

/// Scalar keys the engine binds when rendering templates.
pub const BINDING_KEYS: &[&str] = &[
    "applicant.name",
    "applicant.age",
    "applicant.address",
    "applicant.relation",
    "applicant.relative_name",
    "applicant.contact",
    "applicant.email",
    "guardian.name",
    "guardian.age",
    "guardian.relation",
    "authority.name",
    "authority.address",
    "jurisdiction.name",
    "designation",
    "designation.upper",
    "fee.amount",
    "fee.words",
    "fee_rule",
    "payment.modes",
    "payment.mode",
    "bpl.card_number",
    "stamp.value",
    "stamp_act",
    "guardian_age_limit",
    "format",
    "language",
    "subject",
    "reference",
    "reference_date",
    "place",
    "statement_count",
    "category.name",
    "category.citation",
    "category.note",
    "category.keywords",
    "appeal.reason",
    "appeal.statement",
    "appeal.prayer",
    "appeal.original_date",
];

/// Keys bound to lists. Only valid as a whole paragraph.
pub const LIST_BINDING_KEYS: &[&str] = &["request.items", "statements", "appeal.grounds"];

/// Text rendered for a known key with no value in the current input.
pub const UNBOUND_PLACEHOLDER: &str = "____________";

/// Assembly stage. Clauses are emitted stage by stage in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseStage {
    Structural,
    Jurisdiction,
    Category,
    Closing,
}

impl ClauseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Jurisdiction => "jurisdiction",
            Self::Category => "category",
            Self::Closing => "closing",
        }
    }
}

/// Document section a clause is laid out in. Sections appear in the
/// composed document in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Stamp paper endorsement printed above the title.
    Endorsement,
    Heading,
    Addressee,
    Reference,
    Subject,
    Introduction,
    /// Information sought, affidavit statements, or the original request.
    Request,
    Grounds,
    Prayer,
    /// Category notes and category-mandated submissions.
    Notes,
    /// Fee, format, severability and declaration paragraphs.
    Undertakings,
    Verification,
    Signature,
    /// Notary, magistrate or oath commissioner block.
    Attestation,
}

impl SectionKind {
    /// Every section, in layout order.
    pub const ALL: [SectionKind; 14] = [
        Self::Endorsement,
        Self::Heading,
        Self::Addressee,
        Self::Reference,
        Self::Subject,
        Self::Introduction,
        Self::Request,
        Self::Grounds,
        Self::Prayer,
        Self::Notes,
        Self::Undertakings,
        Self::Verification,
        Self::Signature,
        Self::Attestation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Endorsement => "endorsement",
            Self::Heading => "heading",
            Self::Addressee => "addressee",
            Self::Reference => "reference",
            Self::Subject => "subject",
            Self::Introduction => "introduction",
            Self::Request => "request",
            Self::Grounds => "grounds",
            Self::Prayer => "prayer",
            Self::Notes => "notes",
            Self::Undertakings => "undertakings",
            Self::Verification => "verification",
            Self::Signature => "signature",
            Self::Attestation => "attestation",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applicability predicate of a clause.
///
/// Written in rule data as a mapping tagged by `when`, e.g.
/// `{ when: category, id: personal_information }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Predicate {
    /// Always applies.
    #[default]
    Always,
    /// Applies only when a matched category lists this clause.
    Referenced,
    /// The input's jurisdiction resolves to `id`.
    Jurisdiction { id: JurisdictionId },
    /// Category `id` was detected in the input text.
    Category { id: CategoryId },
    /// The principal party is below the profile's guardian age limit and a
    /// guardian is named.
    MinorWithGuardian,
    /// The applicant is below the poverty line and the profile exempts such
    /// applicants from a prescribed fee.
    BplFeeWaiver,
    /// The profile prescribes a fee for the document kind.
    FeePrescribed,
    /// A fee is prescribed and not waived.
    FeePayable,
    /// The profile requires stamp paper for the document kind.
    StampPaper,
    /// The profile requires witness identification.
    WitnessRequired,
    /// The profile's attestation format is `format`.
    Notarization { format: NotarizationFormat },
    /// The input carries a reference number.
    HasReference,
    /// Every inner predicate applies.
    All { of: Vec<Predicate> },
    /// The inner predicate does not apply.
    Not { of: Box<Predicate> },
}

impl Predicate {
    /// Whether the predicate holds unconditionally.
    pub fn is_unconditional(&self) -> bool {
        match self {
            Self::Always => true,
            Self::All { of } => of.iter().all(Predicate::is_unconditional),
            _ => false,
        }
    }

    /// Visit this predicate and every nested predicate.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Predicate)) {
        visit(self);
        match self {
            Self::All { of } => {
                for p in of {
                    p.walk(visit);
                }
            }
            Self::Not { of } => of.walk(visit),
            _ => {}
        }
    }
}

/// How a catalog entry is expanded at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expansion {
    #[default]
    None,
    PerJurisdiction,
    PerCategory,
}

/// One clause in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseSpec {
    pub id: ClauseId,
    pub stage: ClauseStage,
    pub section: SectionKind,
    /// Document kinds the clause may appear in.
    pub kinds: Vec<DocumentKind>,
    #[serde(default)]
    pub applies: Predicate,
    #[serde(default)]
    pub expand: Expansion,
    /// Ordered paragraphs.
    pub template: Vec<String>,
    /// Citation template.
    #[serde(default)]
    pub citation: Option<String>,
    /// Human-readable reason template.
    pub reason: String,
    /// Category bound for `category.*` keys. Set by per-category expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_category: Option<CategoryId>,
}

impl ClauseSpec {
    /// Whether the clause may appear in `kind`.
    pub fn applies_to(&self, kind: DocumentKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Every template string of the clause: paragraphs, citation, reason.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.template
            .iter()
            .map(String::as_str)
            .chain(self.citation.as_deref())
            .chain(std::iter::once(self.reason.as_str()))
    }
}

/// Iterate the placeholder keys of a template, trimmed.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    let mut rest = template;
    std::iter::from_fn(move || {
        let start = rest.find("{{")?;
        let after = &rest[start + 2..];
        let end = after.find("}}")?;
        rest = &after[end + 2..];
        Some(after[..end].trim())
    })
}

/// If `paragraph` is exactly one list placeholder, return its key.
pub fn list_placeholder(paragraph: &str) -> Option<&str> {
    let inner = paragraph.trim().strip_prefix("{{")?.strip_suffix("}}")?;
    let key = inner.trim();
    LIST_BINDING_KEYS.contains(&key).then_some(key)
}

/// Substitute every placeholder through `lookup`. Keys without a value
/// render as [`UNBOUND_PLACEHOLDER`].
pub fn render(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let key = after[..end].trim();
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => out.push_str(UNBOUND_PLACEHOLDER),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_extracted_in_order() {
        let keys: Vec<_> = placeholders("I, {{applicant.name}}, of {{ applicant.address }}.").collect();
        assert_eq!(keys, vec!["applicant.name", "applicant.address"]);
        assert_eq!(placeholders("no bindings").count(), 0);
        assert_eq!(placeholders("dangling {{open").count(), 0);
    }

    #[test]
    fn render_substitutes_and_marks_unbound() {
        let out = render("Rs. {{fee.amount}}/- via {{payment.mode}}", |k| {
            (k == "fee.amount").then(|| "10".to_string())
        });
        assert_eq!(out, format!("Rs. 10/- via {UNBOUND_PLACEHOLDER}"));
    }

    #[test]
    fn render_leaves_dangling_braces() {
        assert_eq!(render("a {{b", |_| None), "a {{b");
    }

    #[test]
    fn list_placeholder_detection() {
        assert_eq!(list_placeholder(" {{ statements }} "), Some("statements"));
        assert_eq!(list_placeholder("{{applicant.name}}"), None);
        assert_eq!(list_placeholder("Items: {{request.items}}"), None);
    }

    #[test]
    fn section_order_is_layout_order() {
        let mut sorted = SectionKind::ALL;
        sorted.sort();
        assert_eq!(sorted, SectionKind::ALL);
        assert_eq!(SectionKind::Endorsement.as_str(), "endorsement");
    }

    #[test]
    fn stage_order() {
        assert!(ClauseStage::Structural < ClauseStage::Jurisdiction);
        assert!(ClauseStage::Jurisdiction < ClauseStage::Category);
        assert!(ClauseStage::Category < ClauseStage::Closing);
    }

    #[test]
    fn predicate_yaml_forms() {
        let p: Predicate = serde_yaml::from_str("when: always").unwrap();
        assert_eq!(p, Predicate::Always);
        let p: Predicate =
            serde_yaml::from_str("{ when: category, id: personal_information }").unwrap();
        assert!(matches!(p, Predicate::Category { .. }));
        let p: Predicate = serde_yaml::from_str(
            "when: all\nof:\n  - { when: fee_payable }\n  - when: not\n    of: { when: witness_required }\n",
        )
        .unwrap();
        let mut count = 0;
        p.walk(&mut |_| count += 1);
        assert_eq!(count, 4);
        assert!(!p.is_unconditional());
        let p: Predicate = serde_yaml::from_str("{ when: notarization, format: magistrate_court }").unwrap();
        assert_eq!(
            p,
            Predicate::Notarization {
                format: NotarizationFormat::MagistrateCourt
            }
        );
    }

    #[test]
    fn clause_spec_defaults() {
        let yaml = r#"
id: rti_heading
stage: structural
section: heading
kinds: [rti_application]
template: ["APPLICATION UNDER THE RIGHT TO INFORMATION ACT, 2005"]
reason: Statutory heading.
"#;
        let spec: ClauseSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.applies, Predicate::Always);
        assert_eq!(spec.expand, Expansion::None);
        assert!(spec.citation.is_none());
        assert_eq!(spec.templates().count(), 2);
    }
}
