//! # Regulatory Categories
//!
//! A category is a regulatory classification inferred from request text,
//! such as personal information (Section 8(1)(j)) or cabinet papers
//! (Section 8(1)(i)). Each carries the keywords that trigger it, the
//! citation and remediation reported by the validator, a severity, and the
//! clauses it makes mandatory.

use serde::{Deserialize, Serialize};
use vidhi_core::{CategoryId, ClauseId, DocumentKind};

/// How a category match affects the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySeverity {
    /// Generation proceeds; the finding is carried into the explanation.
    Warning,
    /// Generation is refused.
    Block,
}

impl CategorySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Block => "block",
        }
    }
}

/// A regulatory category with its detection keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Document kinds whose text is scanned for this category.
    pub document_kinds: Vec<DocumentKind>,
    /// Keyword phrases, matched case-insensitively on token boundaries.
    pub keywords: Vec<String>,
    /// Exemption citation (e.g. "Section 8(1)(j), RTI Act 2005").
    pub citation: String,
    pub severity: CategorySeverity,
    /// Clauses that must be included whenever this category matches.
    #[serde(default)]
    pub clauses: Vec<ClauseId>,
    /// Suggested fix reported with the finding.
    pub remediation: String,
    /// Note rendered into the document when the category's notice clause
    /// is included.
    #[serde(default)]
    pub note: Option<String>,
}

impl CategoryRule {
    /// Whether the category applies to `kind`.
    pub fn applies_to(&self, kind: DocumentKind) -> bool {
        self.document_kinds.contains(&kind)
    }

    /// Keywords as token sequences, in declaration order. Keywords that
    /// normalize to nothing are skipped.
    pub fn keyword_tokens(&self) -> impl Iterator<Item = (&str, Vec<String>)> {
        self.keywords
            .iter()
            .map(|k| (k.as_str(), tokenize(k)))
            .filter(|(_, tokens)| !tokens.is_empty())
    }
}

/// Split text into lower-cased alphanumeric tokens. Every other character
/// is a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
