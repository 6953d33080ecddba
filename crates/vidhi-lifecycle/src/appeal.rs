//! # First Appeal Derivation
//!
//! A first appeal is built from its parent RTI application's stored input.
//! The party, guardian, authority, request body and payment details are
//! copied unchanged; only the kind, the date and the appeal context are
//! new. Heading, addressee, grounds and prayer then come out of the normal
//! pipeline for the new kind.

use chrono::NaiveDate;
use vidhi_core::{DocumentKind, Timestamp};
use vidhi_engine::{AppealContext, ApplicationInput};
use vidhi_rules::{AppealGround, AppealTrigger};

use crate::record::DocumentRecord;
use crate::state::DocumentState;

/// Why `parent` cannot be appealed on `ground` at `now`, or `None` when
/// it can.
pub fn ineligibility(parent: &DocumentRecord, ground: &AppealGround, now: Timestamp) -> Option<String> {
    if parent.kind != DocumentKind::RtiApplication {
        return Some(format!("only RTI applications can be appealed, not {}", parent.kind));
    }
    let state = parent.effective_state(now);
    if !state.is_appealable() {
        return Some(format!(
            "document is {state}; an appeal needs a recorded reply or a lapsed reply deadline"
        ));
    }
    let required = match ground.requires {
        AppealTrigger::ReplyReceived => DocumentState::ReplyReceived,
        AppealTrigger::DeadlineExpired => DocumentState::DeadlineExpired,
    };
    if state != required {
        return Some(format!(
            "reason {:?} requires the document to be {required}, but it is {state}",
            ground.code
        ));
    }
    if let Some(d) = parent.deadlines() {
        if d.is_appeal_window_closed(now) {
            return Some(format!("the first appeal window closed at {}", d.appeal_deadline()));
        }
    }
    None
}

/// The input of a first appeal against `parent`, dated `today`.
pub fn appeal_input(parent: &DocumentRecord, reason_code: &str, today: NaiveDate) -> ApplicationInput {
    let original = &parent.input;
    ApplicationInput {
        kind: DocumentKind::FirstAppeal,
        reference_date: today,
        appeal: Some(AppealContext {
            parent_id: parent.id.clone(),
            reason_code: reason_code.trim().to_lowercase(),
            original_date: original.reference_date,
        }),
        statements: Vec::new(),
        ..original.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LifecycleEvent;
    use crate::tests::{engine_at, rti_input};
    use vidhi_rules::{EmbeddedSource, RuleSet};

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn submitted_parent(rules: &RuleSet) -> DocumentRecord {
        let generated = engine_at("2026-01-15T09:30:00Z")
            .generate(&rti_input("Maharashtra"))
            .unwrap()
            .into_generated()
            .unwrap();
        let mut r = DocumentRecord::from_generated(generated, None).unwrap();
        let profile = rules.jurisdiction("Maharashtra").unwrap();
        r.apply(LifecycleEvent::Submit, at("2026-01-15T10:00:00Z"), profile).unwrap();
        r
    }

    #[test]
    fn reason_must_match_parent_state() {
        let rules = RuleSet::load(&EmbeddedSource).unwrap();
        let parent = submitted_parent(&rules);
        let no_response = rules.appeal_ground("no_response").unwrap();
        let rejected = rules.appeal_ground("rejected").unwrap();

        let within = at("2026-02-01T00:00:00Z");
        assert!(ineligibility(&parent, no_response, within).unwrap().contains("SUBMITTED"));

        let lapsed = at("2026-02-20T00:00:00Z");
        assert_eq!(ineligibility(&parent, no_response, lapsed), None);
        let reason = ineligibility(&parent, rejected, lapsed).unwrap();
        assert!(reason.contains("REPLY_RECEIVED"), "{reason}");
    }

    #[test]
    fn appeal_window_closes_at_the_appeal_deadline() {
        let rules = RuleSet::load(&EmbeddedSource).unwrap();
        let parent = submitted_parent(&rules);
        let no_response = rules.appeal_ground("no_response").unwrap();
        let last = parent.deadlines().unwrap().appeal_deadline();
        assert_eq!(last, at("2026-03-16T10:00:00Z"));

        assert_eq!(ineligibility(&parent, no_response, last), None);
        let reason = ineligibility(&parent, no_response, at("2026-03-16T10:00:01Z")).unwrap();
        assert!(reason.contains("window closed"), "{reason}");
        assert!(ineligibility(&parent, no_response, at("2027-02-19T09:30:00Z")).is_some());
    }

    #[test]
    fn appeal_input_copies_party_and_body() {
        let rules = RuleSet::load(&EmbeddedSource).unwrap();
        let parent = submitted_parent(&rules);
        let today = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let input = appeal_input(&parent, " No_Response ", today);

        assert_eq!(input.kind, DocumentKind::FirstAppeal);
        assert_eq!(input.reference_date, today);
        assert_eq!(input.applicant, parent.input.applicant);
        assert_eq!(input.authority, parent.input.authority);
        assert_eq!(input.body, parent.input.body);
        assert_eq!(input.jurisdiction, "Maharashtra");
        let ctx = input.appeal.unwrap();
        assert_eq!(ctx.parent_id, parent.id);
        assert_eq!(ctx.reason_code, "no_response");
        assert_eq!(ctx.original_date, parent.input.reference_date);
    }
}
