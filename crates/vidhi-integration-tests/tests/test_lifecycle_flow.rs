//! Lifecycle flows across the engine, the manager and both record stores:
//! submission, deadline expiry, late replies and first appeals.

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use vidhi_cli::file_store::JsonFileRecordStore;
use vidhi_core::{Clock, DocumentKind, ManualClock, Timestamp, SECONDS_PER_DAY};
use vidhi_engine::{ApplicationInput, Authority, DocumentEngine, Party};
use vidhi_lifecycle::{
    DeadlineKind, DocumentRecord, DocumentState, InMemoryRecordStore, LifecycleError, LifecycleEvent,
    LifecycleManager, RecordStore, Urgency,
};
use vidhi_rules::{EmbeddedSource, RuleStore, SectionKind};

const START: &str = "2026-01-15T09:30:00Z";

fn manager_with(store: Arc<dyn RecordStore>) -> (LifecycleManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Timestamp::parse(START).unwrap()));
    let rules = Arc::new(RuleStore::load(&EmbeddedSource).unwrap());
    let engine = DocumentEngine::new(rules, Arc::clone(&clock) as Arc<dyn Clock>);
    (LifecycleManager::new(engine, store), clock)
}

fn manager() -> (LifecycleManager, Arc<ManualClock>) {
    manager_with(Arc::new(InMemoryRecordStore::new()))
}

fn rti(jurisdiction: &str) -> ApplicationInput {
    ApplicationInput {
        kind: DocumentKind::RtiApplication,
        jurisdiction: jurisdiction.to_string(),
        applicant: Party {
            name: "Farhan Shaikh".into(),
            age: Some(52),
            address: "Flat 3, Gulmohar Apartments, Nagpur, Maharashtra 440010".into(),
            ..Party::default()
        },
        guardian: None,
        authority: Some(Authority {
            name: "Nagpur Municipal Corporation".into(),
            address: "Civil Lines, Nagpur 440001".into(),
        }),
        body: "Copies of the sanctioned estimates for the drainage works in Dharampeth for the year 2025".into(),
        statements: Vec::new(),
        reference_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
        reference_number: Some("NMC/RTI/2026/17".into()),
        below_poverty_line: false,
        bpl_card_number: None,
        payment_mode: Some("Indian Postal Order".into()),
        format_preference: None,
        language: None,
        place: Some("Nagpur".into()),
        appeal: None,
    }
}

fn drafted(m: &LifecycleManager, input: &ApplicationInput) -> DocumentRecord {
    let generated = m.engine().generate(input).unwrap().into_generated().unwrap();
    m.create_record(generated, None).unwrap()
}

fn section_text(record: &DocumentRecord, name: SectionKind) -> Vec<String> {
    record
        .document
        .section(name)
        .map(|s| s.body.clone())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Submission and deadlines
// ---------------------------------------------------------------------------

#[test]
fn submission_sets_deadlines_from_jurisdiction_windows() {
    let (m, _) = manager();
    let record = drafted(&m, &rti("Maharashtra"));
    assert_eq!(record.stored_state(), DocumentState::Drafted);
    assert!(record.deadlines().is_none());

    let submitted = m.submit(&record.id).unwrap();
    let d = submitted.deadlines().unwrap();
    assert_eq!(d.submitted_at().to_iso8601(), START);
    assert_eq!(d.reply_deadline().to_iso8601(), "2026-02-14T09:30:00Z");
    assert_eq!(d.appeal_deadline().to_iso8601(), "2026-03-16T09:30:00Z");
    assert_eq!(submitted.transitions().len(), 1);
    assert_eq!(submitted.transitions()[0].from_state, DocumentState::Drafted);
    assert_eq!(submitted.transitions()[0].to_state, DocumentState::Submitted);
}

#[test]
fn days_remaining_counts_down_and_crosses_zero_at_the_deadline() {
    let (m, clock) = manager();
    let id = drafted(&m, &rti("Maharashtra")).id;
    m.submit(&id).unwrap();

    assert_eq!(m.days_remaining(&id, clock.now()).unwrap(), Some(30));
    assert_eq!(m.urgency(&id, clock.now()).unwrap(), Some(Urgency::Normal));

    clock.advance_days(24);
    assert_eq!(m.days_remaining(&id, clock.now()).unwrap(), Some(6));
    assert_eq!(m.urgency(&id, clock.now()).unwrap(), Some(Urgency::Urgent));

    clock.advance_days(6);
    assert_eq!(m.days_remaining(&id, clock.now()).unwrap(), Some(0));
    assert_eq!(m.effective_state(&id).unwrap(), DocumentState::Submitted);

    clock.advance_secs(1);
    assert!(m.days_remaining(&id, clock.now()).unwrap().unwrap() < 0);
    assert_eq!(m.urgency(&id, clock.now()).unwrap(), Some(Urgency::Expired));
    assert_eq!(m.effective_state(&id).unwrap(), DocumentState::DeadlineExpired);
    assert_eq!(m.get(&id).unwrap().stored_state(), DocumentState::Submitted);
}

#[test]
fn pending_deadlines_list_running_reply_and_appeal_windows() {
    let (m, clock) = manager();
    let early = drafted(&m, &rti("Maharashtra")).id;
    m.submit(&early).unwrap();

    clock.advance_days(3);
    let mut later_input = rti("Delhi");
    later_input.reference_number = None;
    let later = drafted(&m, &later_input).id;
    m.submit(&later).unwrap();
    drafted(&m, &rti("Karnataka"));

    let pending = m.pending_deadlines(clock.now()).unwrap();
    let ids: Vec<_> = pending.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![early.clone(), later.clone()]);
    assert!(pending.iter().all(|p| p.deadline == DeadlineKind::Reply));

    clock.advance_days(28);
    let pending = m.pending_deadlines(clock.now()).unwrap();
    let running: Vec<_> = pending.iter().map(|p| (p.id.clone(), p.deadline)).collect();
    assert_eq!(running, vec![(later.clone(), DeadlineKind::Reply), (early.clone(), DeadlineKind::Appeal)]);
    assert_eq!(pending[1].due.to_iso8601(), "2026-03-16T09:30:00Z");
    assert_eq!(pending[1].days_remaining, 29);

    clock.advance_days(40);
    assert!(m.pending_deadlines(clock.now()).unwrap().is_empty());
}

#[test]
fn late_reply_and_close() {
    let (m, clock) = manager();
    let id = drafted(&m, &rti("Maharashtra")).id;
    m.submit(&id).unwrap();
    clock.advance_days(40);
    assert_eq!(m.effective_state(&id).unwrap(), DocumentState::DeadlineExpired);

    let replied = m.record_reply(&id).unwrap();
    assert_eq!(replied.stored_state(), DocumentState::ReplyReceived);
    assert_eq!(replied.transitions()[1].from_state, DocumentState::DeadlineExpired);

    let closed = m.close(&id).unwrap();
    assert!(closed.stored_state().is_terminal());
    let err = m.submit(&id).unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
}

#[test]
fn rejected_transition_leaves_the_stored_record_unchanged() {
    let (m, _) = manager();
    let id = drafted(&m, &rti("Maharashtra")).id;
    let before = m.get(&id).unwrap();

    assert!(matches!(
        m.transition(&id, LifecycleEvent::RecordReply),
        Err(LifecycleError::InvalidTransition { .. })
    ));
    assert!(matches!(
        m.transition(&id, LifecycleEvent::FileAppeal),
        Err(LifecycleError::InvalidTransition { .. })
    ));
    assert_eq!(m.get(&id).unwrap(), before);
}

#[test]
fn blocked_generation_creates_no_record() {
    let (m, _) = manager();
    let mut input = rti("Maharashtra");
    input.body = "Details of military deployment near the border".into();
    assert!(m.engine().generate(&input).unwrap().is_blocked());
    assert!(m.records().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// First appeal
// ---------------------------------------------------------------------------

#[test]
fn appeal_after_expired_deadline_preserves_the_parties() {
    let (m, clock) = manager();
    let parent = drafted(&m, &rti("Maharashtra"));
    m.submit(&parent.id).unwrap();

    let early = m.generate_appeal(&parent.id, "no_response").unwrap_err();
    assert!(matches!(early, LifecycleError::IneligibleForAppeal { .. }));

    clock.advance_days(31);
    let appeal = m.generate_appeal(&parent.id, "no_response").unwrap();

    assert_eq!(appeal.kind, DocumentKind::FirstAppeal);
    assert_eq!(appeal.parent_id.as_ref(), Some(&parent.id));
    assert_eq!(appeal.stored_state(), DocumentState::Drafted);
    assert_eq!(appeal.input.applicant.name, parent.input.applicant.name);
    assert_eq!(appeal.input.applicant.address, parent.input.applicant.address);
    assert_eq!(appeal.input.body, parent.input.body);
    assert_eq!(appeal.input.jurisdiction, parent.input.jurisdiction);

    assert_ne!(section_text(&appeal, SectionKind::Heading), section_text(&parent, SectionKind::Heading));
    assert_ne!(section_text(&appeal, SectionKind::Addressee), section_text(&parent, SectionKind::Addressee));
    assert!(section_text(&parent, SectionKind::Grounds).is_empty());
    assert!(!section_text(&appeal, SectionKind::Grounds).is_empty());
    assert!(appeal.document.to_text().contains("First Appellate Authority"));

    let parent_now = m.get(&parent.id).unwrap();
    assert_eq!(parent_now.stored_state(), DocumentState::AppealFiled);
    let last = parent_now.transitions().last().unwrap();
    assert_eq!(last.from_state, DocumentState::DeadlineExpired);
    assert_eq!(last.event, LifecycleEvent::FileAppeal);
    assert_eq!(m.store().list_by_parent(&parent.id).unwrap().len(), 1);
}

#[test]
fn appeal_after_the_filing_window_is_refused() {
    let (m, clock) = manager();
    let parent = drafted(&m, &rti("Maharashtra"));
    m.submit(&parent.id).unwrap();

    clock.set(Timestamp::parse("2026-03-16T09:30:01Z").unwrap());
    assert!(matches!(
        m.generate_appeal(&parent.id, "no_response"),
        Err(LifecycleError::IneligibleForAppeal { .. })
    ));
    clock.set(Timestamp::parse("2027-02-19T09:30:00Z").unwrap());
    assert!(m.generate_appeal(&parent.id, "no_response").is_err());
    assert_eq!(m.records().unwrap().len(), 1);
    assert_eq!(m.effective_state(&parent.id).unwrap(), DocumentState::DeadlineExpired);
}

#[test]
fn appeal_reason_must_match_parent_state() {
    let (m, clock) = manager();
    let id = drafted(&m, &rti("Maharashtra")).id;
    m.submit(&id).unwrap();
    clock.advance_days(10);
    m.record_reply(&id).unwrap();

    assert!(matches!(
        m.generate_appeal(&id, "no_response"),
        Err(LifecycleError::IneligibleForAppeal { .. })
    ));
    assert!(matches!(
        m.generate_appeal(&id, "misfiled_in_triplicate"),
        Err(LifecycleError::UnknownAppealReason(_))
    ));

    clock.advance_days(1);
    m.generate_appeal(&id, "unsatisfactory_reply").unwrap();
    assert!(matches!(
        m.generate_appeal(&id, "rejected"),
        Err(LifecycleError::IneligibleForAppeal { .. })
    ));
    assert_eq!(m.records().unwrap().len(), 2);
}

#[test]
fn affidavits_are_not_appealable() {
    let (m, _) = manager();
    let mut input = rti("Gujarat");
    input.kind = DocumentKind::Affidavit;
    input.authority = None;
    input.body = String::new();
    input.reference_number = None;
    input.payment_mode = None;
    input.applicant.relative_name = Some("Yusuf Shaikh".into());
    input.statements = vec!["I have been residing at the above address since 2010".into()];
    let record = drafted(&m, &input);

    assert!(m.submit(&record.id).unwrap().deadlines().is_none());
    assert!(matches!(
        m.generate_appeal(&record.id, "no_response"),
        Err(LifecycleError::IneligibleForAppeal { .. })
    ));
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

#[test]
fn file_store_carries_the_flow_across_managers() {
    let dir = tempfile::tempdir().unwrap();
    let store = || Arc::new(JsonFileRecordStore::new(dir.path().join("records"))) as Arc<dyn RecordStore>;

    let (first, clock) = manager_with(store());
    let id = drafted(&first, &rti("Maharashtra")).id;
    first.submit(&id).unwrap();

    let (second, second_clock) = manager_with(store());
    second_clock.set(clock.now());
    second_clock.advance_days(45);
    assert_eq!(second.effective_state(&id).unwrap(), DocumentState::DeadlineExpired);
    let appeal = second.generate_appeal(&id, "no_response").unwrap();

    let reloaded = store().get(&appeal.id).unwrap().unwrap();
    assert_eq!(reloaded, appeal);
    assert_eq!(store().get(&id).unwrap().unwrap().stored_state(), DocumentState::AppealFiled);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn days_remaining_never_increases(a in 0i64..90 * SECONDS_PER_DAY, b in 0i64..90 * SECONDS_PER_DAY) {
        let (m, clock) = manager();
        let id = drafted(&m, &rti("Maharashtra")).id;
        let record = m.submit(&id).unwrap();
        let start = clock.now().epoch_secs();
        let (earlier, later) = (a.min(b), a.max(b));

        let at = |offset: i64| Timestamp::from_epoch_secs(start + offset).unwrap();
        let d_earlier = record.days_remaining(at(earlier)).unwrap();
        let d_later = record.days_remaining(at(later)).unwrap();
        prop_assert!(d_later <= d_earlier);
        prop_assert_eq!(record.urgency(at(earlier)).unwrap(), Urgency::classify(d_earlier));
        prop_assert_eq!(d_earlier < 0, record.effective_state(at(earlier)) == DocumentState::DeadlineExpired);
    }
}
