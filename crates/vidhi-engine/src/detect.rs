//! # Category Detection
//!
//! Deterministic keyword matching of free text against the category
//! rules of the current rule set.
//!
//! Text and keywords are tokenized identically ([`tokenize`]). A keyword
//! matches when its tokens occur contiguously in the text. The last
//! keyword token also accepts a plural form (`number` matches `numbers`,
//! `tax` matches `taxes`); no other partial match is accepted, so
//! `cabinetry` never matches `cabinet`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use vidhi_core::{CategoryId, DocumentKind};
use vidhi_rules::{tokenize, RuleSet};

/// One detected category with the keywords that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub category_id: CategoryId,
    /// Matched keywords as written in rule data, sorted and deduplicated.
    pub matched_keywords: Vec<String>,
}

/// Detect the categories of `kind` whose keywords occur in `text`.
pub fn detect_categories(rules: &RuleSet, text: &str, kind: DocumentKind) -> BTreeSet<CategoryMatch> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return BTreeSet::new();
    }
    let mut found: BTreeMap<CategoryId, BTreeSet<String>> = BTreeMap::new();
    for rule in rules.categories_for(kind) {
        for (keyword, keyword_tokens) in rule.keyword_tokens() {
            if contains_phrase(&tokens, &keyword_tokens) {
                found
                    .entry(rule.id.clone())
                    .or_default()
                    .insert(keyword.trim().to_string());
            }
        }
    }
    found
        .into_iter()
        .map(|(category_id, keywords)| CategoryMatch {
            category_id,
            matched_keywords: keywords.into_iter().collect(),
        })
        .collect()
}

pub(crate) fn contains_phrase(text: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > text.len() {
        return false;
    }
    let last = phrase.len() - 1;
    text.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(phrase)
            .enumerate()
            .all(|(i, (t, k))| token_matches(t, k, i == last))
    })
}

fn token_matches(text_token: &str, keyword_token: &str, allow_plural: bool) -> bool {
    if text_token == keyword_token {
        return true;
    }
    if !allow_plural {
        return false;
    }
    match text_token.strip_prefix(keyword_token) {
        Some(suffix) => suffix == "s" || suffix == "es",
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vidhi_rules::EmbeddedSource;

    fn rules() -> RuleSet {
        RuleSet::load(&EmbeddedSource).unwrap()
    }

    fn ids(matches: &BTreeSet<CategoryMatch>) -> Vec<&str> {
        matches.iter().map(|m| m.category_id.as_str()).collect()
    }

    #[test]
    fn personal_phone_numbers_match_personal_information() {
        let found = detect_categories(
            &rules(),
            "personal phone numbers of employees",
            DocumentKind::RtiApplication,
        );
        assert_eq!(ids(&found), vec!["personal_information"]);
        let m = found.iter().next().unwrap();
        assert_eq!(m.matched_keywords, vec!["phone number"]);
    }

    #[test]
    fn adjacent_words_do_not_match() {
        let r = rules();
        for text in [
            "expenditure on cabinetry for the office",
            "telephone numbering plan",
            "intelligent transport system tender",
            "bid evaluator appointments",
        ] {
            let found = detect_categories(&r, text, DocumentKind::RtiApplication);
            assert!(found.is_empty(), "{text:?} matched {found:?}");
        }
    }

    #[test]
    fn category_reported_once_with_all_keywords() {
        let found = detect_categories(
            &rules(),
            "Home address, mobile numbers and bank accounts of the contractor. Also the home address again.",
            DocumentKind::RtiApplication,
        );
        assert_eq!(found.len(), 1);
        let m = found.iter().next().unwrap();
        assert_eq!(m.matched_keywords, vec!["bank account", "home address", "mobile number"]);
    }

    #[test]
    fn case_and_punctuation_are_ignored() {
        let found = detect_categories(&rules(), "Copies of CABINET-papers, 2019", DocumentKind::RtiApplication);
        assert_eq!(ids(&found), vec!["cabinet_papers"]);
        let m = found.iter().next().unwrap();
        assert_eq!(m.matched_keywords, vec!["cabinet", "cabinet paper"]);
    }

    #[test]
    fn kind_scopes_categories() {
        let r = rules();
        let text = "I was told the land was sold";
        assert_eq!(ids(&detect_categories(&r, text, DocumentKind::Affidavit)), vec!["hearsay"]);
        assert!(detect_categories(&r, text, DocumentKind::RtiApplication).is_empty());
    }

    #[test]
    fn empty_text_has_no_matches() {
        assert!(detect_categories(&rules(), "  ...  ", DocumentKind::RtiApplication).is_empty());
    }

    #[test]
    fn plural_only_on_last_token() {
        assert!(contains_phrase(
            &tokenize("phone numbers"),
            &tokenize("phone number")
        ));
        assert!(!contains_phrase(&tokenize("phones number"), &tokenize("phone number")));
        assert!(contains_phrase(&tokenize("income tax returns"), &tokenize("income tax return")));
    }

    proptest! {
        #[test]
        fn detection_is_deterministic(text in "[a-zA-Z ,.]{0,200}") {
            let r = rules();
            let a = detect_categories(&r, &text, DocumentKind::RtiApplication);
            let b = detect_categories(&r, &text, DocumentKind::RtiApplication);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn keyword_always_detected_in_any_context(prefix in "[a-z ]{0,40}", suffix in "[a-z ]{0,40}") {
            let text = format!("{prefix} aadhaar number {suffix}");
            let found = detect_categories(&rules(), &text, DocumentKind::RtiApplication);
            prop_assert!(found.iter().any(|m| m.category_id.as_str() == "personal_information"));
        }
    }
}
