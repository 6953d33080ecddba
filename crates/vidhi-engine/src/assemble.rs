//! # Clause Assembler
//!
//! Walks the expanded clause catalog in assembly order, decides which
//! clauses apply to one input, and renders them. Every included clause
//! yields a [`ClauseDecision`] recording what triggered it, why it is
//! there and its legal basis.
//!
//! The decision list is the single output of assembly: the composer lays
//! the document out from it and the explanation report is printed from
//! it, so the two can never disagree.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vidhi_core::ClauseId;
use vidhi_rules::clause::list_placeholder;
use vidhi_rules::{
    render, CategoryRule, ClauseSpec, ClauseStage, JurisdictionProfile, Predicate, RuleSet, SectionKind,
    UNBOUND_PLACEHOLDER,
};

use crate::bindings::{Bindings, CategoryBinding};
use crate::detect::CategoryMatch;
use crate::input::{non_blank, ApplicationInput};
use crate::verdict::ValidationFinding;

/// Trigger recorded for clauses without conditions.
pub const UNCONDITIONAL: &str = "unconditional";

/// Why a clause was included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionReason {
    /// Machine-readable description of the predicate that held, e.g.
    /// `jurisdiction=Maharashtra, fee=10`.
    pub trigger: String,
    /// Rendered reason text from the catalog.
    pub explanation: String,
}

/// One included clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseDecision {
    pub clause_id: ClauseId,
    pub stage: ClauseStage,
    pub section: SectionKind,
    /// Rendered paragraphs.
    pub rendered_content: Vec<String>,
    pub reason: DecisionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// Inputs to one assembly pass.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub input: &'a ApplicationInput,
    pub profile: &'a JurisdictionProfile,
    pub rules: &'a RuleSet,
    pub matches: &'a BTreeSet<CategoryMatch>,
    /// Findings of the validation pass, used to report the severity a
    /// category clause was triggered with.
    pub findings: &'a [ValidationFinding],
    pub bindings: &'a Bindings,
}

impl<'a> AssemblyContext<'a> {
    fn matched(&self, id: &str) -> Option<&'a CategoryMatch> {
        self.matches.iter().find(|m| m.category_id.as_str() == id)
    }

    fn category_severity(&self, rule: &CategoryRule) -> &'a str {
        let rule_id = format!("exemption.{}", rule.id);
        self.findings
            .iter()
            .find(|f| f.rule_id == rule_id)
            .map_or(rule.severity.as_str(), |f| f.severity.as_str())
    }

    fn fee(&self) -> Option<u32> {
        self.profile.fee_for(self.input.kind)
    }

    fn fee_waived(&self) -> bool {
        self.input.below_poverty_line && self.profile.bpl_exemption && self.fee().is_some()
    }
}

/// Decide and render every applicable clause, in assembly order.
pub fn assemble(ctx: &AssemblyContext<'_>) -> Vec<ClauseDecision> {
    let mut decisions = Vec::new();
    for clause in ctx.rules.clauses_for(ctx.input.kind) {
        let Some(parts) = evaluate(&clause.applies, clause, ctx) else {
            continue;
        };
        let trigger = if parts.is_empty() {
            UNCONDITIONAL.to_string()
        } else {
            parts.join(", ")
        };
        let decision = render_clause(clause, trigger, ctx);
        tracing::trace!(clause = %decision.clause_id, trigger = %decision.reason.trigger, "clause included");
        decisions.push(decision);
    }
    decisions
}

fn render_clause(clause: &ClauseSpec, trigger: String, ctx: &AssemblyContext<'_>) -> ClauseDecision {
    let category = clause
        .bound_category
        .as_ref()
        .and_then(|id| ctx.rules.category(id))
        .map(|rule| CategoryBinding {
            rule,
            matched: ctx.matched(rule.id.as_str()),
        });
    let lookup = |key: &str| ctx.bindings.lookup(key, category);

    let mut rendered_content = Vec::with_capacity(clause.template.len());
    for paragraph in &clause.template {
        match list_placeholder(paragraph) {
            Some(key) => match ctx.bindings.list(key) {
                Some(items) if !items.is_empty() => rendered_content.extend(items.iter().cloned()),
                _ => rendered_content.push(UNBOUND_PLACEHOLDER.to_string()),
            },
            None => rendered_content.push(render(paragraph, lookup)),
        }
    }

    ClauseDecision {
        clause_id: clause.id.clone(),
        stage: clause.stage,
        section: clause.section,
        rendered_content,
        reason: DecisionReason {
            trigger,
            explanation: render(&clause.reason, lookup),
        },
        citation: clause.citation.as_deref().map(|c| render(c, lookup)),
    }
}

/// Evaluate `predicate`. `Some(parts)` when it holds, with the trigger
/// parts describing why; `None` when it does not.
fn evaluate(predicate: &Predicate, clause: &ClauseSpec, ctx: &AssemblyContext<'_>) -> Option<Vec<String>> {
    let input = ctx.input;
    let profile = ctx.profile;
    match predicate {
        Predicate::Always => Some(Vec::new()),
        Predicate::Referenced => {
            let parts: Vec<String> = ctx
                .matches
                .iter()
                .filter_map(|m| ctx.rules.category(&m.category_id))
                .filter(|rule| rule.clauses.iter().any(|c| c.as_str() == clause.id.base()))
                .map(|rule| format!("category={}, citation={}", rule.id, rule.citation))
                .collect();
            (!parts.is_empty()).then_some(parts)
        }
        Predicate::Jurisdiction { id } => (profile.id == *id).then(|| vec![format!("jurisdiction={id}")]),
        Predicate::Category { id } => {
            let m = ctx.matched(id.as_str())?;
            let rule = ctx.rules.category(&m.category_id)?;
            Some(vec![format!(
                "category={}, citation={}, severity={}",
                rule.id,
                rule.citation,
                ctx.category_severity(rule)
            )])
        }
        Predicate::MinorWithGuardian => {
            if !input.kind.requires_principal_party() {
                return None;
            }
            let age = input.applicant.age?;
            let guardian = input.guardian.as_ref().filter(|g| !g.name.trim().is_empty())?;
            (age < profile.guardian_age_limit).then(|| {
                let relation = ctx.bindings.get("guardian.relation").unwrap_or(UNBOUND_PLACEHOLDER);
                vec![format!(
                    "party.age={age}<{}, party.guardian={relation} ({})",
                    profile.guardian_age_limit,
                    guardian.name.trim()
                )]
            })
        }
        Predicate::BplFeeWaiver => ctx
            .fee_waived()
            .then(|| vec![format!("below_poverty_line=true, fee_waived={}", ctx.fee().unwrap_or(0))]),
        Predicate::FeePrescribed => ctx.fee().map(|fee| vec![format!("fee={fee}")]),
        Predicate::FeePayable => {
            let fee = ctx.fee()?;
            (!ctx.fee_waived()).then(|| vec![format!("fee={fee}")])
        }
        Predicate::StampPaper => profile
            .stamp_paper_for(input.kind)
            .map(|value| vec![format!("stamp_paper={value}")]),
        Predicate::WitnessRequired => profile
            .witness_required
            .then(|| vec!["witness_required=true".to_string()]),
        Predicate::Notarization { format } => {
            (profile.notarization == *format).then(|| vec![format!("notarization={format}")])
        }
        Predicate::HasReference => non_blank(input.reference_number.as_deref())
            .map(|r| vec![format!("reference_number={r}")]),
        Predicate::All { of } => {
            let mut parts = Vec::new();
            for p in of {
                parts.extend(evaluate(p, clause, ctx)?);
            }
            Some(parts)
        }
        Predicate::Not { of } => match evaluate(of, clause, ctx) {
            Some(_) => None,
            None => Some(vec![format!("not({})", label(of))]),
        },
    }
}

/// Short name of a predicate for negated triggers.
fn label(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Always => "always".to_string(),
        Predicate::Referenced => "referenced".to_string(),
        Predicate::Jurisdiction { id } => format!("jurisdiction={id}"),
        Predicate::Category { id } => format!("category={id}"),
        Predicate::MinorWithGuardian => "minor_with_guardian".to_string(),
        Predicate::BplFeeWaiver => "bpl_fee_waiver".to_string(),
        Predicate::FeePrescribed => "fee_prescribed".to_string(),
        Predicate::FeePayable => "fee_payable".to_string(),
        Predicate::StampPaper => "stamp_paper".to_string(),
        Predicate::WitnessRequired => "witness_required".to_string(),
        Predicate::Notarization { format } => format!("notarization={format}"),
        Predicate::HasReference => "has_reference".to_string(),
        Predicate::All { of } => of.iter().map(label).collect::<Vec<_>>().join(" and "),
        Predicate::Not { of } => format!("not({})", label(of)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::detect::detect_categories;
    use crate::input::tests::{affidavit_input, rti_input};
    use crate::input::Guardian;
    use crate::validate::{validate, ValidationContext};
    use chrono::NaiveDate;
    use vidhi_rules::EmbeddedSource;

    fn rules() -> RuleSet {
        RuleSet::load(&EmbeddedSource).unwrap()
    }

    fn run(rules: &RuleSet, input: &ApplicationInput) -> Vec<ClauseDecision> {
        let config = EngineConfig::default();
        let profile = rules.jurisdiction(&input.jurisdiction).unwrap();
        let matches = detect_categories(rules, &input.free_text(), input.kind);
        let result = validate(&ValidationContext {
            input,
            profile: Some(profile),
            matches: &matches,
            rules,
            today: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            config: &config,
        });
        let bindings = Bindings::build(input, profile, rules, &config);
        assemble(&AssemblyContext {
            input,
            profile,
            rules,
            matches: &matches,
            findings: &result.findings,
            bindings: &bindings,
        })
    }

    fn find<'a>(decisions: &'a [ClauseDecision], id: &str) -> Option<&'a ClauseDecision> {
        decisions.iter().find(|d| d.clause_id.as_str() == id)
    }

    fn ids(decisions: &[ClauseDecision]) -> Vec<&str> {
        decisions.iter().map(|d| d.clause_id.as_str()).collect()
    }

    #[test]
    fn personal_information_in_maharashtra() {
        let r = rules();
        let decisions = run(&r, &rti_input("Maharashtra", "personal phone numbers of employees"));

        let fee = find(&decisions, "rti_fee_payment@Maharashtra").unwrap();
        assert_eq!(fee.reason.trigger, "jurisdiction=Maharashtra, fee=10");
        assert!(fee.reason.explanation.contains("Maharashtra"));
        assert_eq!(fee.citation.as_deref(), Some("Maharashtra Right to Information Rules, 2005"));
        assert!(fee.rendered_content[0].contains("Rs. 10/- (Rupees Ten only)"));

        let notice = find(&decisions, "exemption_notice@personal_information").unwrap();
        assert_eq!(
            notice.reason.trigger,
            "category=personal_information, citation=Section 8(1)(j), RTI Act 2005, severity=warning"
        );
        assert_eq!(notice.citation.as_deref(), Some("Section 8(1)(j), RTI Act 2005"));
        assert!(notice.reason.explanation.contains("phone number"));

        let interest = find(&decisions, "larger_public_interest").unwrap();
        assert!(interest.reason.trigger.starts_with("category=personal_information"));

        assert!(find(&decisions, "third_party_notice").is_none());
        assert!(find(&decisions, "bpl_fee_waiver").is_none());
        assert_eq!(
            ids(&decisions)
                .iter()
                .filter(|id| id.starts_with("rti_fee_payment@"))
                .count(),
            1
        );
    }

    #[test]
    fn decisions_follow_stage_order() {
        let r = rules();
        let decisions = run(&r, &rti_input("Delhi", "copies of cabinet papers and tender documents for 2023"));
        assert!(decisions.windows(2).all(|w| w[0].stage <= w[1].stage));
        assert_eq!(decisions[0].clause_id.as_str(), "rti_heading");
        assert_eq!(decisions[0].reason.trigger, UNCONDITIONAL);
    }

    #[test]
    fn switching_jurisdiction_changes_fee_clause() {
        let r = rules();
        let body = "Copies of the muster rolls for 2024";
        let delhi = run(&r, &rti_input("Delhi", body));
        let gujarat = run(&r, &rti_input("Gujarat", body));
        let d = find(&delhi, "rti_fee_payment@Delhi").unwrap();
        let g = find(&gujarat, "rti_fee_payment@Gujarat").unwrap();
        assert_ne!(d.rendered_content, g.rendered_content);
        assert!(g.reason.explanation.contains("Gujarat"));
        assert!(g.reason.trigger.contains("jurisdiction=Gujarat"));
        assert!(find(&gujarat, "rti_fee_payment@Delhi").is_none());
    }

    #[test]
    fn bpl_applicant_gets_waiver_instead_of_fee() {
        let r = rules();
        let mut input = rti_input("Maharashtra", "Copies of ration card allotment register for 2024");
        input.below_poverty_line = true;
        input.bpl_card_number = Some("MH-2231".into());
        let decisions = run(&r, &input);
        let waiver = find(&decisions, "bpl_fee_waiver").unwrap();
        assert!(waiver.rendered_content[0].contains("MH-2231"));
        assert!(find(&decisions, "rti_fee_payment@Maharashtra").is_none());
    }

    #[test]
    fn request_items_expand_into_paragraphs() {
        let r = rules();
        let decisions = run(
            &r,
            &rti_input("Delhi", "Copies of the estimate. Names of the contractors. Completion date in 2024."),
        );
        let request = find(&decisions, "rti_information_sought").unwrap();
        assert_eq!(request.rendered_content.len(), 4);
        assert_eq!(request.rendered_content[1], "1. Copies of the estimate;");
    }

    #[test]
    fn reference_clause_needs_a_reference() {
        let r = rules();
        let mut input = rti_input("Delhi", "Copies of the estimate for 2024");
        assert!(find(&run(&r, &input), "reference_number").is_none());
        input.reference_number = Some("PMC/2026/17".into());
        let decisions = run(&r, &input);
        let clause = find(&decisions, "reference_number").unwrap();
        assert_eq!(clause.rendered_content, vec!["Ref No.: PMC/2026/17"]);
        assert_eq!(clause.reason.trigger, "reference_number=PMC/2026/17");
    }

    #[test]
    fn guardian_declaration_replaces_deponent_introduction() {
        let r = rules();
        let mut input = affidavit_input("Karnataka", 16);
        input.guardian = Some(Guardian {
            name: "Meera Mehta".into(),
            age: 45,
            relation: Some("mother".into()),
        });
        let decisions = run(&r, &input);
        let g = find(&decisions, "guardian_declaration").unwrap();
        assert_eq!(g.reason.trigger, "party.age=16<18, party.guardian=mother (Meera Mehta)");
        assert!(g.rendered_content[0].contains("being the mother of Rohan Mehta, a minor aged 16 years"));
        assert!(find(&decisions, "affidavit_deponent_introduction").is_none());
    }

    #[test]
    fn adult_deponent_introduction_negates_guardian() {
        let r = rules();
        let decisions = run(&r, &affidavit_input("Karnataka", 30));
        let intro = find(&decisions, "affidavit_deponent_introduction").unwrap();
        assert_eq!(intro.reason.trigger, "not(minor_with_guardian)");
        assert!(intro.rendered_content[0].contains("aged 30 years, son of Suresh Mehta"));
        assert!(find(&decisions, "guardian_declaration").is_none());
    }

    #[test]
    fn attestation_follows_profile_flags() {
        let r = rules();
        let karnataka = run(&r, &affidavit_input("Karnataka", 30));
        assert!(find(&karnataka, "affidavit_witness_identification").is_some());
        assert!(find(&karnataka, "affidavit_self_identification").is_none());
        assert!(find(&karnataka, "verification_notary").is_some());
        let stamp = find(&karnataka, "affidavit_stamp_paper@Karnataka").unwrap();
        assert!(stamp.rendered_content[0].contains("Rs. 20/-"));

        let gujarat = run(&r, &affidavit_input("Gujarat", 30));
        assert!(find(&gujarat, "verification_solemn_affirmation").is_some());
        assert!(find(&gujarat, "verification_notary").is_none());
        let heading = find(&gujarat, "affidavit_attestation_heading").unwrap();
        assert!(heading.rendered_content[0].starts_with("VERIFICATION BY EXECUTIVE MAGISTRATE"));

        let delhi = run(&r, &affidavit_input("Delhi", 30));
        assert!(find(&delhi, "affidavit_self_identification").is_some());
    }

    #[test]
    fn statements_are_numbered_and_counted() {
        let r = rules();
        let decisions = run(&r, &affidavit_input("Karnataka", 30));
        let statements = find(&decisions, "affidavit_statements").unwrap();
        assert_eq!(statements.rendered_content.len(), 2);
        assert!(statements.rendered_content[0].starts_with("1. That I am a resident"));
        let verification = find(&decisions, "verification_notary").unwrap();
        assert!(verification.rendered_content[0].contains("paragraphs 1 to 2"));
    }

    #[test]
    fn unbound_values_render_as_blanks() {
        let r = rules();
        let mut input = rti_input("Delhi", "Copies of the estimate for 2024");
        input.applicant.contact = None;
        input.place = None;
        let decisions = run(&r, &input);
        let signature = find(&decisions, "rti_signature").unwrap();
        assert!(signature.rendered_content.contains(&format!("Place: {UNBOUND_PLACEHOLDER}")));
        assert!(signature.rendered_content.contains(&format!("Contact: {UNBOUND_PLACEHOLDER}")));
    }

    #[test]
    fn negated_labels() {
        assert_eq!(
            label(&Predicate::Not {
                of: Box::new(Predicate::WitnessRequired)
            }),
            "not(witness_required)"
        );
    }
}
