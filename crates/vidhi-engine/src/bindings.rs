//! # Template Bindings
//!
//! Values substituted into clause templates, derived once per generation
//! from the input, the resolved profile and the rule set. Keys not bound
//! here render as a blank line for the party to fill in by hand.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use vidhi_core::DocumentKind;
use vidhi_rules::{tokenize, CategoryRule, JurisdictionProfile, RuleSet};

use crate::config::EngineConfig;
use crate::detect::CategoryMatch;
use crate::input::{non_blank, ApplicationInput, Gender};

/// Relation used when a guardian does not state one.
pub const DEFAULT_GUARDIAN_RELATION: &str = "lawful guardian";

const SUBJECT_SUMMARY_CHARS: usize = 80;

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\(?[0-9]+[.)]|\(?[a-z][.)]|[-*•])\s+").expect("list marker regex compiles"));

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?]\s+(\p{Lu})").expect("sentence break regex compiles"));

/// Scalar and list bindings for one generation.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    scalars: BTreeMap<&'static str, String>,
    lists: BTreeMap<&'static str, Vec<String>>,
}

/// The category a per-category clause was expanded for, with its match.
#[derive(Debug, Clone, Copy)]
pub struct CategoryBinding<'a> {
    pub rule: &'a CategoryRule,
    pub matched: Option<&'a CategoryMatch>,
}

impl Bindings {
    /// Derive every binding for `input` under `profile`.
    pub fn build(
        input: &ApplicationInput,
        profile: &JurisdictionProfile,
        rules: &RuleSet,
        config: &EngineConfig,
    ) -> Self {
        let mut b = Self::default();
        let kind = input.kind;
        let party = &input.applicant;

        b.set("applicant.name", Some(party.name.trim()));
        b.set_owned("applicant.age", party.age.map(|a| a.to_string()));
        b.set("applicant.address", Some(party.address.trim()));
        b.set("applicant.relation", Some(relation_phrase(party.gender)));
        b.set("applicant.relative_name", non_blank(party.relative_name.as_deref()));
        b.set("applicant.contact", non_blank(party.contact.as_deref()));
        b.set("applicant.email", non_blank(party.email.as_deref()));

        if let Some(guardian) = &input.guardian {
            b.set("guardian.name", Some(guardian.name.trim()));
            b.set_owned("guardian.age", Some(guardian.age.to_string()));
            b.set(
                "guardian.relation",
                Some(non_blank(guardian.relation.as_deref()).unwrap_or(DEFAULT_GUARDIAN_RELATION)),
            );
        }

        b.set("authority.name", Some(input.authority_name().trim()));
        b.set("authority.address", Some(input.authority_address().trim()));

        b.set("jurisdiction.name", Some(profile.name.as_str()));
        if let Some(designation) = profile.designation_for(kind) {
            b.set("designation", Some(designation));
            b.set_owned("designation.upper", Some(designation.to_uppercase()));
        }
        if let Some(fee) = profile.fee_for(kind) {
            b.set_owned("fee.amount", Some(fee.to_string()));
            b.set_owned("fee.words", Some(amount_in_words(fee)));
        }
        b.set("fee_rule", Some(profile.fee_rule.as_str()));
        b.set_owned("payment.modes", Some(profile.payment_modes_joined()));
        b.set("payment.mode", non_blank(input.payment_mode.as_deref()));
        b.set("bpl.card_number", non_blank(input.bpl_card_number.as_deref()));
        if let Some(value) = profile.stamp_paper_for(kind) {
            b.set_owned("stamp.value", Some(value.to_string()));
        }
        b.set("stamp_act", Some(profile.stamp_act.as_str()));
        b.set_owned("guardian_age_limit", Some(profile.guardian_age_limit.to_string()));

        b.set(
            "format",
            Some(non_blank(input.format_preference.as_deref()).unwrap_or(config.default_format.as_str())),
        );
        b.set(
            "language",
            Some(non_blank(input.language.as_deref()).unwrap_or(config.default_language.as_str())),
        );
        b.set("reference", non_blank(input.reference_number.as_deref()));
        b.set_owned("reference_date", Some(format_date(input.reference_date)));
        b.set("place", non_blank(input.place.as_deref()));

        match kind {
            DocumentKind::RtiApplication | DocumentKind::FirstAppeal => {
                let items = request_items(&input.body);
                b.set_owned("subject", Some(derive_subject(&input.body, items.first())));
                b.lists.insert("request.items", number_items(&items));
            }
            DocumentKind::Affidavit => {
                let statements = affidavit_statements(&input.statements);
                b.set_owned("statement_count", Some(statements.len().to_string()));
                b.lists.insert("statements", statements);
            }
        }

        if let Some(appeal) = &input.appeal {
            b.set_owned("appeal.original_date", Some(format_date(appeal.original_date)));
            if let Some(ground) = rules.appeal_ground(&appeal.reason_code) {
                b.set("appeal.reason", Some(ground.label.as_str()));
                b.set("appeal.statement", Some(ground.statement.as_str()));
                b.set("appeal.prayer", Some(ground.prayer.as_str()));
                let grounds: Vec<String> = ground.grounds.iter().map(|g| g.trim().to_string()).collect();
                b.lists.insert("appeal.grounds", number_items(&grounds));
            }
        }

        b
    }

    fn set(&mut self, key: &'static str, value: Option<&str>) {
        self.set_owned(key, value.map(str::to_string));
    }

    fn set_owned(&mut self, key: &'static str, value: Option<String>) {
        match value {
            Some(v) if !v.trim().is_empty() => {
                self.scalars.insert(key, v);
            }
            _ => {
                self.scalars.remove(key);
            }
        }
    }

    /// Scalar value of `key`, if bound.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.scalars.get(key).map(String::as_str)
    }

    /// List value of `key`, if bound.
    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    /// Resolve `key`, letting `category.*` keys come from `category`.
    pub fn lookup(&self, key: &str, category: Option<CategoryBinding<'_>>) -> Option<String> {
        if let Some(field) = key.strip_prefix("category.") {
            let c = category?;
            return match field {
                "name" => Some(c.rule.name.clone()),
                "citation" => Some(c.rule.citation.clone()),
                "note" => c.rule.note.clone(),
                "keywords" => c.matched.map(|m| m.matched_keywords.join(", ")),
                _ => None,
            };
        }
        self.get(key).map(str::to_string)
    }
}

/// "son of", "daughter of" or the neutral form.
pub fn relation_phrase(gender: Option<Gender>) -> &'static str {
    match gender {
        Some(Gender::Male) => "son of",
        Some(Gender::Female) => "daughter of",
        Some(Gender::Other) | None => "son/daughter of",
    }
}

/// Date in the dd/mm/yyyy form used on Indian court papers.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

// ---------------------------------------------------------------------------
// Request text
// ---------------------------------------------------------------------------

/// Split a request body into items. Each non-empty line is an item (list
/// markers are dropped); a single-line body is split into sentences.
pub fn request_items(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let pieces: Vec<String> = if lines.len() > 1 {
        lines
            .iter()
            .map(|l| LIST_MARKER.replace(l, "").into_owned())
            .collect()
    } else {
        lines.first().map(|l| split_sentences(l)).unwrap_or_default()
    };
    pieces
        .into_iter()
        .map(|p| clean_item(&p))
        .filter(|p| !p.is_empty())
        .collect()
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for caps in SENTENCE_BREAK.captures_iter(text) {
        let (Some(whole), Some(next)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Keep the terminator with the sentence it ends.
        out.push(text[start..whole.start() + 1].to_string());
        start = next.start();
    }
    out.push(text[start..].to_string());
    out
}

fn clean_item(item: &str) -> String {
    item.trim()
        .trim_end_matches(|c: char| c == '.' || c == ';' || c == ',')
        .trim()
        .to_string()
}

/// Number items as "1. item;" with the last item ending in a full stop.
/// Items ending in a question mark keep it.
pub fn number_items(items: &[String]) -> Vec<String> {
    let last = items.len().saturating_sub(1);
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item = item.trim();
            let terminator = if item.ends_with('?') {
                ""
            } else if i == last {
                "."
            } else {
                ";"
            };
            format!("{}. {item}{terminator}", i + 1)
        })
        .collect()
}

/// Affidavit statements as numbered "That ..." paragraphs.
pub fn affidavit_statements(statements: &[String]) -> Vec<String> {
    statements
        .iter()
        .map(|s| clean_item(s))
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, s)| {
            let prefixed = s.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("that "));
            let body = if prefixed { s[5..].trim_start().to_string() } else { s };
            format!("{}. That {body}.", i + 1)
        })
        .collect()
}

/// Subject line for an RTI application, specific to what is sought.
pub fn derive_subject(body: &str, first_item: Option<&String>) -> String {
    let tokens = tokenize(body);
    let has = |word: &str| tokens.iter().any(|t| t == word);
    let prefix = if has("copy") || has("copies") {
        "Request for certified copies of records under Section 6(1) of the RTI Act, 2005"
    } else if has("list") {
        "Request for a list of records under Section 6(1) of the RTI Act, 2005"
    } else {
        "Request for information under Section 6(1) of the RTI Act, 2005"
    };
    match first_item.map(|i| summarize(i)) {
        Some(summary) if !summary.is_empty() => format!("{prefix} regarding {summary}"),
        _ => prefix.to_string(),
    }
}

fn summarize(item: &str) -> String {
    let item = item.trim().trim_end_matches('?');
    if item.chars().count() <= SUBJECT_SUMMARY_CHARS {
        return item.to_string();
    }
    let mut out = String::new();
    for word in item.split_whitespace() {
        if out.chars().count() + word.chars().count() + 1 > SUBJECT_SUMMARY_CHARS {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.push_str("...");
    out
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven", "Twelve",
    "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Rupee amount in words, Indian numbering (thousand, lakh, crore).
pub fn amount_in_words(amount: u32) -> String {
    if amount == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::new();
    let mut rest = amount;
    for (unit, name) in [(10_000_000, "Crore"), (100_000, "Lakh"), (1_000, "Thousand"), (100, "Hundred")] {
        let count = rest / unit;
        if count > 0 {
            parts.push(format!("{} {name}", below_hundred_words(count)));
            rest %= unit;
        }
    }
    if rest > 0 {
        parts.push(below_hundred_words(rest));
    }
    parts.join(" ")
}

/// Words for `n`; crore counts above 99 recurse.
fn below_hundred_words(n: u32) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                ones => format!("{tens} {}", ONES[ones as usize]),
            }
        }
        _ => amount_in_words(n),
    }
}
