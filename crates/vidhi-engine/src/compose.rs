//! # Document Composer
//!
//! Lays clause decisions out as a [`StructuredDocument`]: sections in
//! fixed layout order, each holding the paragraphs of its clauses in
//! decision order. Composition is pure; the same input and decisions
//! always give byte-identical canonical bytes.

use serde::{Deserialize, Serialize};
use vidhi_core::{CanonicalBytes, CanonicalizationError, ClauseId, DocumentKind};
use vidhi_rules::{JurisdictionProfile, SectionKind};

use crate::assemble::ClauseDecision;
use crate::config::EngineConfig;
use crate::input::{non_blank, ApplicationInput};

/// One laid-out section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: SectionKind,
    /// Paragraphs, in order.
    pub body: Vec<String>,
    /// Clauses the paragraphs came from.
    pub clause_refs: Vec<ClauseId>,
}

/// A composed document, ready for a renderer to typeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub title: String,
    pub kind: DocumentKind,
    /// Canonical jurisdiction name.
    pub jurisdiction: String,
    pub language: String,
    pub sections: Vec<Section>,
}

impl StructuredDocument {
    /// Canonical (JCS) bytes, the input to document identification.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    pub fn section(&self, name: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Every paragraph, in reading order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().flat_map(|s| s.body.iter().map(String::as_str))
    }

    /// Plain-text rendering: sections separated by blank lines.
    pub fn to_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.body.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Compose the document for `input` from its clause decisions.
pub fn compose(
    input: &ApplicationInput,
    profile: &JurisdictionProfile,
    decisions: &[ClauseDecision],
    config: &EngineConfig,
) -> StructuredDocument {
    let sections = SectionKind::ALL
        .into_iter()
        .filter_map(|name| {
            let mut section = Section {
                name,
                body: Vec::new(),
                clause_refs: Vec::new(),
            };
            for decision in decisions.iter().filter(|d| d.section == name) {
                section.body.extend(decision.rendered_content.iter().cloned());
                section.clause_refs.push(decision.clause_id.clone());
            }
            (!section.clause_refs.is_empty()).then_some(section)
        })
        .collect();

    let party = input.applicant.name.trim();
    let title = if party.is_empty() {
        input.kind.title().to_string()
    } else {
        format!("{} - {party}", input.kind.title())
    };

    StructuredDocument {
        title,
        kind: input.kind,
        jurisdiction: profile.name.clone(),
        language: non_blank(input.language.as_deref())
            .unwrap_or(config.default_language.as_str())
            .to_string(),
        sections,
    }
}
