//! # Document Kind Profiles
//!
//! Per-kind data used before an input exists: the keyword tables that
//! suggest a document kind from a free-text description of the need, and
//! the base complexity the assessment score starts from.
//!
//! Keywords use the same token matching as category detection. Negative
//! keywords count against a kind; strong phrases are first-person
//! formulations that almost always mean this kind (e.g. "I hereby declare"
//! for an affidavit).

use serde::{Deserialize, Serialize};
use vidhi_core::DocumentKind;

use crate::category::tokenize;

/// Highest base complexity a kind may declare.
pub const MAX_KIND_COMPLEXITY: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindProfile {
    pub kind: DocumentKind,
    /// Base complexity, 1 to [`MAX_KIND_COMPLEXITY`].
    pub complexity: u8,
    /// What the user is trying to do, phrased as a clarification option.
    pub purpose: String,
    /// How to proceed once this kind is chosen.
    pub approach: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    #[serde(default)]
    pub strong_phrases: Vec<String>,
}

impl KindProfile {
    pub fn keyword_tokens(&self) -> impl Iterator<Item = (&str, Vec<String>)> {
        phrase_tokens(&self.keywords)
    }

    pub fn negative_tokens(&self) -> impl Iterator<Item = (&str, Vec<String>)> {
        phrase_tokens(&self.negative_keywords)
    }

    pub fn strong_tokens(&self) -> impl Iterator<Item = (&str, Vec<String>)> {
        phrase_tokens(&self.strong_phrases)
    }
}

fn phrase_tokens(phrases: &[String]) -> impl Iterator<Item = (&str, Vec<String>)> {
    phrases
        .iter()
        .map(|p| (p.as_str(), tokenize(p)))
        .filter(|(_, tokens)| !tokens.is_empty())
}
