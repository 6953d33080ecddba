//! # Validator
//!
//! An ordered pipeline of independent checks over one input. Each check
//! appends findings to a shared [`VerdictResult`]; none reads another's
//! output, so the order only fixes the order findings are reported in.
//!
//! ## Checks
//!
//! | Check | Class | Severity |
//! |-------|-------|----------|
//! | jurisdiction resolves | structural | block |
//! | required fields per kind | structural | block |
//! | age range, guardian | structural / legal | block, advisory |
//! | category exemptions | legal | per category |
//! | reference date | legal | block (future), warning (stale) |
//! | appeal reason code | structural | block |
//! | fee and payment mode | legal | warning |
//! | filing language | legal | warning |
//! | drafting quality | advisory | advisory |

use std::collections::BTreeSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use vidhi_core::DocumentKind;
use vidhi_rules::{CategorySeverity, JurisdictionProfile, RuleSet, DEFAULT_GUARDIAN_AGE_LIMIT};

use crate::config::EngineConfig;
use crate::detect::CategoryMatch;
use crate::input::{non_blank, ApplicationInput};
use crate::verdict::{Severity, ValidationFinding, VerdictResult};

/// Youngest age a guardian may depose at.
pub const MIN_GUARDIAN_AGE: u32 = DEFAULT_GUARDIAN_AGE_LIMIT;

/// Accepted range for a deponent's age.
pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;

const REQUEST_MIN_CHARS: usize = 30;
const REQUEST_MAX_CHARS: usize = 3000;
const MAX_QUESTIONS: usize = 2;
const MAX_STATEMENTS: usize = 30;
const STATEMENT_MIN_CHARS: usize = 10;
const ADDRESS_MIN_CHARS: usize = 15;
const NAME_MIN_CHARS: usize = 3;

static PIN_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[1-9][0-9]{5}\b").expect("PIN code regex compiles"));

static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+91)?[6-9][0-9]{9}$").expect("mobile regex compiles"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex compiles")
});

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L} .'-]+$").expect("name regex compiles"));

static TIME_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b((19|20)[0-9]{2}|january|february|march|april|june|july|august|september|october|november|december|period|since|between|during|till|until|financial\s+year|last\s+\w+\s+(years?|months?))\b",
    )
    .expect("time period regex compiles")
});

static UNSPECIFIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(all\s+(the\s+)?(information|documents|records|details|files)|everything|any\s+and\s+all)\b")
        .expect("unspecific request regex compiles")
});

/// Everything a check may read.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub input: &'a ApplicationInput,
    /// The resolved profile, `None` when the jurisdiction is unknown.
    pub profile: Option<&'a JurisdictionProfile>,
    pub matches: &'a BTreeSet<CategoryMatch>,
    pub rules: &'a RuleSet,
    /// Today's date from the injected clock.
    pub today: NaiveDate,
    pub config: &'a EngineConfig,
}

type Check = fn(&ValidationContext<'_>, &mut VerdictResult);

/// Checks in reporting order.
const CHECKS: &[(&str, Check)] = &[
    ("jurisdiction", check_jurisdiction),
    ("required_fields", check_required_fields),
    ("age_and_guardian", check_age_and_guardian),
    ("category_exemptions", check_category_exemptions),
    ("dates", check_dates),
    ("appeal_reason", check_appeal_reason),
    ("fee_and_payment", check_fee_and_payment),
    ("language", check_language),
    ("party_quality", check_party_quality),
    ("request_quality", check_request_quality),
    ("statement_quality", check_statement_quality),
];

/// Run every check and compute the verdict.
pub fn validate(ctx: &ValidationContext<'_>) -> VerdictResult {
    let mut result = VerdictResult::default();
    for (name, check) in CHECKS {
        let before = result.findings.len();
        check(ctx, &mut result);
        let added = result.findings.len() - before;
        if added > 0 {
            tracing::debug!(check = *name, findings = added, "validation check reported");
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Structural checks
// ---------------------------------------------------------------------------

fn check_jurisdiction(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    if ctx.profile.is_some() {
        return;
    }
    let known: Vec<&str> = ctx.rules.jurisdictions().map(|p| p.id.as_str()).collect();
    result.push(
        ValidationFinding::structural(
            "jurisdiction_unknown",
            "jurisdiction",
            format!("jurisdiction {:?} is not in the rule set", ctx.input.jurisdiction.trim()),
        )
        .with_remediation(format!("Use one of: {}.", known.join(", "))),
    );
}

fn require(result: &mut VerdictResult, present: bool, field: &str, label: &str) {
    if !present {
        result.push(
            ValidationFinding::structural("required_field", field, format!("{label} is required"))
                .with_remediation(format!("Provide the {label}.")),
        );
    }
}

fn check_required_fields(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    let input = ctx.input;
    let party = &input.applicant;
    require(result, !party.name.trim().is_empty(), "applicant.name", "applicant name");
    require(result, !party.address.trim().is_empty(), "applicant.address", "applicant address");

    match input.kind {
        DocumentKind::RtiApplication | DocumentKind::FirstAppeal => {
            require(result, !input.authority_name().trim().is_empty(), "authority.name", "public authority name");
            require(
                result,
                !input.authority_address().trim().is_empty(),
                "authority.address",
                "public authority address",
            );
            require(result, !input.body.trim().is_empty(), "body", "information sought");
            if input.kind == DocumentKind::FirstAppeal {
                require(result, input.appeal.is_some(), "appeal", "appeal context");
            }
        }
        DocumentKind::Affidavit => {
            require(result, party.age.is_some(), "applicant.age", "deponent age");
            require(
                result,
                non_blank(party.relative_name.as_deref()).is_some(),
                "applicant.relative_name",
                "father's, mother's or spouse's name",
            );
            require(
                result,
                input.statements.iter().any(|s| !s.trim().is_empty()),
                "statements",
                "at least one statement",
            );
        }
    }
}

fn check_appeal_reason(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    if ctx.input.kind != DocumentKind::FirstAppeal {
        return;
    }
    let Some(appeal) = &ctx.input.appeal else {
        return;
    };
    if ctx.rules.appeal_ground(&appeal.reason_code).is_none() {
        let known: Vec<&str> = ctx.rules.appeal_grounds().map(|g| g.code.as_str()).collect();
        result.push(
            ValidationFinding::structural(
                "appeal_reason_unknown",
                "appeal.reason_code",
                format!("appeal reason {:?} is not known", appeal.reason_code),
            )
            .with_remediation(format!("Use one of: {}.", known.join(", "))),
        );
    }
}

// ---------------------------------------------------------------------------
// Legal checks
// ---------------------------------------------------------------------------

fn check_age_and_guardian(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    if !ctx.input.kind.requires_principal_party() {
        return;
    }
    let Some(age) = ctx.input.applicant.age else {
        return;
    };
    if !AGE_RANGE.contains(&age) {
        result.push(
            ValidationFinding::structural(
                "age_out_of_range",
                "applicant.age",
                format!(
                    "deponent age {age} is outside {}..={}",
                    AGE_RANGE.start(),
                    AGE_RANGE.end()
                ),
            )
            .with_remediation("Enter the deponent's age in completed years."),
        );
        return;
    }

    let limit = ctx
        .profile
        .map_or(DEFAULT_GUARDIAN_AGE_LIMIT, |p| p.guardian_age_limit);
    if age >= limit {
        return;
    }

    let citation = "Section 3, Indian Majority Act, 1875";
    match &ctx.input.guardian {
        Some(guardian) if !guardian.name.trim().is_empty() => {
            if guardian.age < MIN_GUARDIAN_AGE {
                result.push(
                    ValidationFinding::legal(
                        "guardian_underage",
                        Severity::Block,
                        format!(
                            "guardian {} is aged {}, below {MIN_GUARDIAN_AGE}",
                            guardian.name.trim(),
                            guardian.age
                        ),
                    )
                    .with_field("guardian.age")
                    .with_citation(citation)
                    .with_remediation("Name an adult parent or legal guardian."),
                );
            } else if non_blank(guardian.relation.as_deref()).is_none() {
                result.push(
                    ValidationFinding::advisory(
                        "guardian_relation_missing",
                        "guardian relation not given; the declaration will read \"lawful guardian\"",
                    )
                    .with_field("guardian.relation")
                    .with_remediation("State the guardian's relation to the minor, e.g. mother or father."),
                );
            }
        }
        _ => result.push(
            ValidationFinding::legal(
                "guardian_required",
                Severity::Block,
                format!("deponent aged {age} is below {limit} and no guardian is named"),
            )
            .with_field("guardian")
            .with_citation(citation)
            .with_remediation(
                "Name a parent or legal guardian (name, age and relation) to depose on the minor's behalf.",
            ),
        ),
    }
}

fn check_category_exemptions(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    let field = match ctx.input.kind {
        DocumentKind::Affidavit => "statements",
        DocumentKind::RtiApplication | DocumentKind::FirstAppeal => "body",
    };
    for m in ctx.matches {
        let Some(rule) = ctx.rules.category(&m.category_id) else {
            continue;
        };
        let severity = match rule.severity {
            CategorySeverity::Warning => Severity::Warning,
            CategorySeverity::Block => Severity::Block,
        };
        result.push(
            ValidationFinding::legal(
                format!("exemption.{}", rule.id),
                severity,
                format!(
                    "mentions {}, which may fall under {} ({})",
                    m.matched_keywords.join(", "),
                    rule.name.to_lowercase(),
                    rule.citation
                ),
            )
            .with_field(field)
            .with_citation(rule.citation.clone())
            .with_remediation(rule.remediation.clone()),
        );
    }
}

fn check_dates(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    let date = ctx.input.reference_date;
    if date > ctx.today {
        result.push(
            ValidationFinding::legal(
                "date_in_future",
                Severity::Block,
                format!("reference date {date} is after today ({})", ctx.today),
            )
            .with_field("reference_date")
            .with_remediation("Use today's date or the date the document is actually made."),
        );
    } else {
        let age_days = (ctx.today - date).num_days();
        if age_days > i64::from(ctx.config.staleness_days) {
            result.push(
                ValidationFinding::legal(
                    "date_stale",
                    Severity::Warning,
                    format!(
                        "reference date {date} is {age_days} days old (more than {})",
                        ctx.config.staleness_days
                    ),
                )
                .with_field("reference_date")
                .with_remediation("Confirm the date or redate the document before filing."),
            );
        }
    }

    if let Some(appeal) = &ctx.input.appeal {
        if appeal.original_date > date {
            result.push(
                ValidationFinding::legal(
                    "appeal_date_order",
                    Severity::Block,
                    format!(
                        "original application date {} is after the appeal date {date}",
                        appeal.original_date
                    ),
                )
                .with_field("appeal.original_date"),
            );
        }
    }
}

fn check_fee_and_payment(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    let Some(profile) = ctx.profile else {
        return;
    };
    if profile.fee_for(ctx.input.kind).is_none() {
        return;
    }
    let input = ctx.input;
    if input.below_poverty_line {
        if !profile.bpl_exemption {
            result.push(
                ValidationFinding::legal(
                    "bpl_not_exempt",
                    Severity::Warning,
                    format!("{} does not exempt BPL applicants from the fee", profile.name),
                )
                .with_field("below_poverty_line")
                .with_citation(profile.fee_rule.clone())
                .with_remediation("Pay the prescribed fee."),
            );
        } else if non_blank(input.bpl_card_number.as_deref()).is_none() {
            result.push(
                ValidationFinding::legal(
                    "bpl_card_missing",
                    Severity::Warning,
                    "fee exemption claimed without a BPL card number",
                )
                .with_field("bpl_card_number")
                .with_citation("Section 7(5), RTI Act 2005")
                .with_remediation("Give the BPL card number and attach a copy of the card."),
            );
        }
        return;
    }
    if let Some(mode) = non_blank(input.payment_mode.as_deref()) {
        if !profile.accepts_payment_mode(mode) {
            result.push(
                ValidationFinding::legal(
                    "payment_mode_unsupported",
                    Severity::Warning,
                    format!("{} does not accept payment by {mode}", profile.name),
                )
                .with_field("payment_mode")
                .with_citation(profile.fee_rule.clone())
                .with_remediation(format!("Pay by {}.", profile.payment_modes_joined())),
            );
        }
    }
}

fn check_language(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    let (Some(profile), Some(language)) = (ctx.profile, non_blank(ctx.input.language.as_deref())) else {
        return;
    };
    if !profile.supports_language(language) {
        result.push(
            ValidationFinding::legal(
                "language_unsupported",
                Severity::Warning,
                format!("{} does not list {language} as a filing language", profile.name),
            )
            .with_field("language")
            .with_remediation(format!("File in one of: {}.", profile.languages.join(", "))),
        );
    }
}

// ---------------------------------------------------------------------------
// Drafting advisories
// ---------------------------------------------------------------------------

fn check_party_quality(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    let party = &ctx.input.applicant;

    let name = party.name.trim();
    if !name.is_empty() && (name.chars().count() < NAME_MIN_CHARS || !NAME.is_match(name)) {
        result.push(
            ValidationFinding::advisory("name_format", format!("name {name:?} looks incomplete or contains unusual characters"))
                .with_field("applicant.name")
                .with_remediation("Give the full name as it appears on identity documents."),
        );
    }

    let address = party.address.trim();
    if !address.is_empty() {
        if !PIN_CODE.is_match(address) {
            result.push(
                ValidationFinding::advisory("address_pin_missing", "address has no 6-digit PIN code")
                    .with_field("applicant.address")
                    .with_remediation("Add the PIN code so that the reply can be delivered."),
            );
        }
        if address.chars().count() < ADDRESS_MIN_CHARS {
            result.push(
                ValidationFinding::advisory("address_short", "address is very short")
                    .with_field("applicant.address")
                    .with_remediation("Give a complete postal address."),
            );
        }
    }

    if let Some(contact) = non_blank(party.contact.as_deref()) {
        let compact: String = contact.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
        if !MOBILE.is_match(&compact) && !EMAIL.is_match(contact) {
            result.push(
                ValidationFinding::advisory(
                    "contact_invalid",
                    format!("contact {contact:?} is neither a 10-digit mobile number nor an e-mail address"),
                )
                .with_field("applicant.contact"),
            );
        }
    }
    if let Some(email) = non_blank(party.email.as_deref()) {
        if !EMAIL.is_match(email) {
            result.push(
                ValidationFinding::advisory("contact_invalid", format!("e-mail address {email:?} is malformed"))
                    .with_field("applicant.email"),
            );
        }
    }
}

fn check_request_quality(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    if ctx.input.kind != DocumentKind::RtiApplication {
        return;
    }
    let body = ctx.input.body.trim();
    if body.is_empty() {
        return;
    }
    let chars = body.chars().count();
    if chars < REQUEST_MIN_CHARS {
        result.push(
            ValidationFinding::advisory("request_brief", "the information sought is very brief")
                .with_field("body")
                .with_remediation("Describe the records sought specifically enough for the office to locate them."),
        );
    }
    if chars > REQUEST_MAX_CHARS {
        result.push(
            ValidationFinding::advisory(
                "request_long",
                format!("the information sought runs to {chars} characters"),
            )
            .with_field("body")
            .with_remediation("Split unrelated requests into separate applications."),
        );
    }
    if !TIME_PERIOD.is_match(body) {
        result.push(
            ValidationFinding::advisory("request_no_period", "no time period is mentioned")
                .with_field("body")
                .with_remediation("Name the period the records cover, e.g. \"from April 2024 to March 2025\"."),
        );
    }
    let questions = body.matches('?').count();
    if questions > MAX_QUESTIONS {
        result.push(
            ValidationFinding::advisory(
                "request_questions",
                format!("the request asks {questions} questions"),
            )
            .with_field("body")
            .with_remediation("Ask for records rather than explanations; a PIO need not answer questions."),
        );
    }
    if UNSPECIFIC.is_match(body) {
        result.push(
            ValidationFinding::advisory("request_unspecific", "the request asks for everything on a subject")
                .with_field("body")
                .with_remediation("Name the specific documents or records sought."),
        );
    }
}

fn check_statement_quality(ctx: &ValidationContext<'_>, result: &mut VerdictResult) {
    if ctx.input.kind != DocumentKind::Affidavit {
        return;
    }
    let statements: Vec<&str> = ctx
        .input
        .statements
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if statements.len() > MAX_STATEMENTS {
        result.push(
            ValidationFinding::advisory(
                "statements_many",
                format!("{} statements; consider splitting the affidavit", statements.len()),
            )
            .with_field("statements"),
        );
    }
    let brief: Vec<String> = statements
        .iter()
        .enumerate()
        .filter(|(_, s)| s.chars().count() < STATEMENT_MIN_CHARS)
        .map(|(i, _)| (i + 1).to_string())
        .collect();
    if !brief.is_empty() {
        result.push(
            ValidationFinding::advisory(
                "statement_brief",
                format!("statement(s) {} are very brief", brief.join(", ")),
            )
            .with_field("statements")
            .with_remediation("State each fact in a complete sentence."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect_categories;
    use crate::input::tests::{affidavit_input, rti_input};
    use crate::input::{AppealContext, Guardian};
    use crate::verdict::Verdict;
    use vidhi_core::DocumentId;
    use vidhi_rules::EmbeddedSource;

    const BODY: &str = "Certified copies of the work orders issued for road repairs in Ward 12 between April 2024 and March 2025";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn run(rules: &RuleSet, input: &ApplicationInput) -> VerdictResult {
        let config = EngineConfig::default();
        let matches = detect_categories(rules, &input.free_text(), input.kind);
        let ctx = ValidationContext {
            input,
            profile: rules.jurisdiction(&input.jurisdiction),
            matches: &matches,
            rules,
            today: today(),
            config: &config,
        };
        validate(&ctx)
    }

    fn rules() -> RuleSet {
        RuleSet::load(&EmbeddedSource).unwrap()
    }

    fn ids(result: &VerdictResult) -> Vec<&str> {
        result.findings.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[test]
    fn clean_rti_application_passes_without_findings() {
        let r = rules();
        let result = run(&r, &rti_input("Maharashtra", BODY));
        assert_eq!(result.verdict, Verdict::Pass);
        assert!(result.findings.is_empty(), "{:?}", ids(&result));
    }

    #[test]
    fn unknown_jurisdiction_blocks() {
        let r = rules();
        let result = run(&r, &rti_input("Atlantis", BODY));
        assert_eq!(result.verdict, Verdict::Blocked);
        let f = result.finding("jurisdiction_unknown").unwrap();
        assert_eq!(f.field.as_deref(), Some("jurisdiction"));
        assert!(f.remediation.as_deref().unwrap().contains("Maharashtra"));
    }

    #[test]
    fn jurisdiction_lookup_ignores_case() {
        let r = rules();
        let result = run(&r, &rti_input("  tamil   NADU ", BODY));
        assert!(!result.has("jurisdiction_unknown"));
    }

    #[test]
    fn missing_fields_are_named() {
        let r = rules();
        let mut input = rti_input("Delhi", "");
        input.authority = None;
        let result = run(&r, &input);
        assert!(result.is_blocked());
        let fields: Vec<_> = result
            .findings
            .iter()
            .filter(|f| f.rule_id == "required_field")
            .filter_map(|f| f.field.as_deref())
            .collect();
        assert_eq!(fields, vec!["authority.name", "authority.address", "body"]);
    }

    #[test]
    fn affidavit_requires_relative_and_statements() {
        let r = rules();
        let mut input = affidavit_input("Karnataka", 30);
        input.applicant.relative_name = Some("  ".into());
        input.statements = vec!["   ".into()];
        let result = run(&r, &input);
        let fields: Vec<_> = result.findings.iter().filter_map(|f| f.field.as_deref()).collect();
        assert!(fields.contains(&"applicant.relative_name"));
        assert!(fields.contains(&"statements"));
    }

    #[test]
    fn minor_without_guardian_is_blocked() {
        let r = rules();
        let result = run(&r, &affidavit_input("Karnataka", 16));
        assert_eq!(result.verdict, Verdict::Blocked);
        let f = result.finding("guardian_required").unwrap();
        assert_eq!(f.severity, Severity::Block);
        assert!(f.citation.is_some());
    }

    #[test]
    fn minor_with_guardian_passes() {
        let r = rules();
        let mut input = affidavit_input("Karnataka", 16);
        input.guardian = Some(Guardian {
            name: "X".into(),
            age: 45,
            relation: None,
        });
        let result = run(&r, &input);
        assert_eq!(result.verdict, Verdict::Pass);
        assert!(result.has("guardian_relation_missing"));
    }

    #[test]
    fn blank_guardian_name_counts_as_missing() {
        let r = rules();
        let mut input = affidavit_input("Karnataka", 12);
        input.guardian = Some(Guardian {
            name: " ".into(),
            age: 40,
            relation: Some("father".into()),
        });
        assert!(run(&r, &input).has("guardian_required"));
    }

    #[test]
    fn underage_guardian_is_blocked() {
        let r = rules();
        let mut input = affidavit_input("Karnataka", 12);
        input.guardian = Some(Guardian {
            name: "Kiran".into(),
            age: 17,
            relation: Some("brother".into()),
        });
        let result = run(&r, &input);
        assert!(result.is_blocked());
        assert!(result.has("guardian_underage"));
    }

    #[test]
    fn age_out_of_range_is_structural() {
        let r = rules();
        for age in [0, 121] {
            let result = run(&r, &affidavit_input("Karnataka", age));
            let f = result.finding("age_out_of_range").unwrap();
            assert_eq!(f.field.as_deref(), Some("applicant.age"));
            assert!(!result.has("guardian_required"));
        }
    }

    #[test]
    fn rti_applicant_age_is_not_checked() {
        let r = rules();
        let mut input = rti_input("Delhi", BODY);
        input.applicant.age = Some(15);
        assert!(!run(&r, &input).has("guardian_required"));
    }

    #[test]
    fn warning_category_gives_pass_with_warnings() {
        let r = rules();
        let input = rti_input(
            "Maharashtra",
            "personal phone numbers of employees posted in the ward office during 2025",
        );
        let result = run(&r, &input);
        assert_eq!(result.verdict, Verdict::PassWithWarnings);
        let f = result.finding("exemption.personal_information").unwrap();
        assert_eq!(f.citation.as_deref(), Some("Section 8(1)(j), RTI Act 2005"));
        assert!(f.remediation.is_some());
    }

    #[test]
    fn block_category_blocks() {
        let r = rules();
        let input = rti_input("Delhi", "deployment records of intelligence staff in 2024 at the airport");
        let result = run(&r, &input);
        assert!(result.is_blocked());
        assert!(result.has("exemption.national_security"));
    }

    #[test]
    fn future_date_blocks_and_old_date_warns() {
        let r = rules();
        let mut input = rti_input("Delhi", BODY);
        input.reference_date = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        assert!(run(&r, &input).has("date_in_future"));

        input.reference_date = today();
        let result = run(&r, &input);
        assert!(!result.has("date_in_future"));
        assert!(!result.has("date_stale"));

        input.reference_date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let result = run(&r, &input);
        assert_eq!(result.verdict, Verdict::PassWithWarnings);
        assert!(result.has("date_stale"));
    }

    #[test]
    fn bpl_without_card_warns() {
        let r = rules();
        let mut input = rti_input("Maharashtra", BODY);
        input.below_poverty_line = true;
        let result = run(&r, &input);
        assert!(result.has("bpl_card_missing"));
        input.bpl_card_number = Some("MH-BPL-2231".into());
        assert!(!run(&r, &input).has("bpl_card_missing"));
    }

    #[test]
    fn bpl_in_jurisdiction_without_exemption_warns() {
        use vidhi_rules::RuleSource;

        let source = EmbeddedSource;
        let mut profiles = source.load_jurisdiction_profiles().unwrap();
        for p in profiles.values_mut() {
            p.bpl_exemption = false;
        }
        let r = RuleSet::from_parts(
            profiles,
            source.load_category_rules().unwrap(),
            source.load_clause_templates().unwrap(),
            source.load_appeal_grounds().unwrap(),
            source.load_kind_profiles().unwrap(),
        )
        .unwrap();
        let mut input = rti_input("Delhi", BODY);
        input.below_poverty_line = true;
        assert!(run(&r, &input).has("bpl_not_exempt"));
    }

    #[test]
    fn payment_mode_and_language_are_checked_against_profile() {
        let r = rules();
        let mut input = rti_input("Delhi", BODY);
        input.payment_mode = Some("Cryptocurrency".into());
        input.language = Some("Marathi".into());
        let result = run(&r, &input);
        assert_eq!(result.verdict, Verdict::PassWithWarnings);
        assert!(result.has("payment_mode_unsupported"));
        assert!(result.has("language_unsupported"));

        input.payment_mode = Some("indian postal order".into());
        input.language = Some("hindi".into());
        assert_eq!(run(&r, &input).verdict, Verdict::Pass);
    }

    #[test]
    fn quality_advisories_never_change_verdict() {
        let r = rules();
        let mut input = rti_input("Delhi", "everything? why? who?");
        input.applicant.address = "Pune".into();
        input.applicant.contact = Some("12345".into());
        input.applicant.name = "A1".into();
        let result = run(&r, &input);
        assert_eq!(result.verdict, Verdict::Pass);
        let ids = ids(&result);
        for expected in [
            "name_format",
            "address_pin_missing",
            "address_short",
            "contact_invalid",
            "request_brief",
            "request_no_period",
            "request_questions",
            "request_unspecific",
        ] {
            assert!(ids.contains(&expected), "missing {expected} in {ids:?}");
        }
    }

    #[test]
    fn long_request_is_flagged() {
        let r = rules();
        let body = format!("{BODY}. {}", "Copies of register entries. ".repeat(120));
        assert!(run(&r, &rti_input("Delhi", &body)).has("request_long"));
    }

    #[test]
    fn contact_accepts_mobile_with_prefix_and_email() {
        let r = rules();
        let mut input = rti_input("Delhi", BODY);
        input.applicant.contact = Some("+91 98765-43210".into());
        assert!(!run(&r, &input).has("contact_invalid"));
        input.applicant.contact = Some("asha@example.in".into());
        assert!(!run(&r, &input).has("contact_invalid"));
        input.applicant.email = Some("not-an-email".into());
        assert!(run(&r, &input).has("contact_invalid"));
    }

    #[test]
    fn brief_and_numerous_statements_are_advised() {
        let r = rules();
        let mut input = affidavit_input("Karnataka", 30);
        input.statements = (0..31).map(|i| format!("statement number {i} of the deponent")).collect();
        input.statements.push("ok".into());
        let result = run(&r, &input);
        assert!(result.has("statements_many"));
        let f = result.finding("statement_brief").unwrap();
        assert!(f.message.contains("32"));
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn appeal_needs_context_and_known_reason() {
        let r = rules();
        let mut input = rti_input("Delhi", BODY);
        input.kind = DocumentKind::FirstAppeal;
        let result = run(&r, &input);
        assert_eq!(result.finding("required_field").unwrap().field.as_deref(), Some("appeal"));

        input.appeal = Some(AppealContext {
            parent_id: DocumentId::new("parent").unwrap(),
            reason_code: "bribery".into(),
            original_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        });
        let result = run(&r, &input);
        assert!(result.has("appeal_reason_unknown"));

        input.appeal.as_mut().unwrap().reason_code = "No_Response".into();
        let result = run(&r, &input);
        assert!(!result.has("appeal_reason_unknown"));
        assert!(!result.is_blocked(), "{:?}", ids(&result));
    }

    #[test]
    fn appeal_before_original_is_blocked() {
        let r = rules();
        let mut input = rti_input("Delhi", BODY);
        input.kind = DocumentKind::FirstAppeal;
        input.appeal = Some(AppealContext {
            parent_id: DocumentId::new("parent").unwrap(),
            reason_code: "rejected".into(),
            original_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
        });
        assert!(run(&r, &input).has("appeal_date_order"));
    }

    #[test]
    fn findings_follow_check_order() {
        let r = rules();
        let mut input = affidavit_input("Nowhere", 10);
        input.reference_date = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        let result = run(&r, &input);
        let ids = ids(&result);
        let pos = |id: &str| ids.iter().position(|x| *x == id).unwrap();
        assert!(pos("jurisdiction_unknown") < pos("guardian_required"));
        assert!(pos("guardian_required") < pos("date_in_future"));
    }
}
