//! # Document Kind Recommendation
//!
//! Suggests which document to prepare from a free-text description of
//! what the user needs, using the keyword tables of the kind profiles.
//!
//! Each kind scores ten points per matched keyword and fifty per matched
//! strong phrase, and loses twenty per matched negative keyword; scores
//! never go below zero. Confidence follows from the top score and its
//! lead over the runner-up. Below [`CONFIDENT_AT`], or when the top two
//! kinds tie, the result asks for clarification and lists the purpose of
//! every kind as the options.

use serde::{Deserialize, Serialize};
use vidhi_core::DocumentKind;
use vidhi_rules::{tokenize, KindProfile, RuleSet};

use crate::detect::contains_phrase;

pub const KEYWORD_POINTS: u32 = 10;
pub const STRONG_PHRASE_POINTS: u32 = 50;
pub const NEGATIVE_KEYWORD_PENALTY: u32 = 20;

/// Confidence at or above which a kind is recommended outright.
pub const CONFIDENT_AT: u8 = 70;

/// How one kind scored against the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindScore {
    pub kind: DocumentKind,
    pub score: u32,
    pub matched_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strong_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Recommended,
    NeedsClarification,
}

/// One answer the user can pick when clarification is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationOption {
    pub kind: DocumentKind,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub status: RecommendationStatus,
    /// The best-scoring kind, if any kind scored above zero. Set even when
    /// clarification is needed.
    pub kind: Option<DocumentKind>,
    /// 0 to 98.
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<String>,
    /// Every kind, best first. Ties keep [`DocumentKind`] order.
    pub scores: Vec<KindScore>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ClarificationOption>,
}

impl Recommendation {
    pub fn is_confident(&self) -> bool {
        self.status == RecommendationStatus::Recommended
    }
}

fn matched<'a>(tokens: &[String], phrases: impl Iterator<Item = (&'a str, Vec<String>)>) -> Vec<String> {
    let mut hits: Vec<String> = phrases
        .filter(|(_, phrase)| contains_phrase(tokens, phrase))
        .map(|(raw, _)| raw.trim().to_string())
        .collect();
    hits.sort();
    hits.dedup();
    hits
}

fn score_kind(profile: &KindProfile, tokens: &[String]) -> KindScore {
    let matched_keywords = matched(tokens, profile.keyword_tokens());
    let strong_phrases = matched(tokens, profile.strong_tokens());
    let negative_keywords = matched(tokens, profile.negative_tokens());

    let points = |n: usize, each: u32| u32::try_from(n).unwrap_or(u32::MAX).saturating_mul(each);
    let gained = points(matched_keywords.len(), KEYWORD_POINTS)
        .saturating_add(points(strong_phrases.len(), STRONG_PHRASE_POINTS));
    let lost = points(negative_keywords.len(), NEGATIVE_KEYWORD_PENALTY);

    KindScore {
        kind: profile.kind,
        score: gained.saturating_sub(lost),
        matched_keywords,
        strong_phrases,
        negative_keywords,
    }
}

/// Confidence for a top score and its lead over the runner-up. A tie is
/// never confident.
fn confidence(top: u32, lead: u32) -> u8 {
    match (top, lead) {
        (0, _) => 0,
        (_, 0) => 50,
        (t, l) if t >= 50 || l >= 30 => 98,
        (t, l) if t >= 30 && l >= 15 => 95,
        (t, l) if t >= 20 && l >= 10 => 85,
        (t, l) if t >= 15 && l >= 5 => 75,
        (t, _) if t >= 10 => 65,
        _ => 50,
    }
}

/// Suggest a document kind for `description`.
pub fn recommend_kind(rules: &RuleSet, description: &str) -> Recommendation {
    let tokens = tokenize(description);
    let mut scores: Vec<KindScore> = rules.kind_profiles().map(|p| score_kind(p, &tokens)).collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.kind.cmp(&b.kind)));

    let top = scores.first().map_or(0, |s| s.score);
    let runner_up = scores.get(1).map_or(0, |s| s.score);
    let confidence = confidence(top, top - runner_up);
    let kind = scores.first().filter(|s| s.score > 0).map(|s| s.kind);

    if confidence >= CONFIDENT_AT {
        let approach = kind.and_then(|k| rules.kind_profile(k)).map(|p| p.approach.clone());
        tracing::debug!(?kind, confidence, "document kind recommended");
        return Recommendation {
            status: RecommendationStatus::Recommended,
            kind,
            confidence,
            approach,
            scores,
            options: Vec::new(),
        };
    }

    tracing::debug!(?kind, confidence, "document kind needs clarification");
    Recommendation {
        status: RecommendationStatus::NeedsClarification,
        kind,
        confidence,
        approach: None,
        scores,
        options: rules
            .kind_profiles()
            .map(|p| ClarificationOption {
                kind: p.kind,
                purpose: p.purpose.clone(),
            })
            .collect(),
    }
}
