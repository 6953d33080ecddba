//! # Document Records
//!
//! The persisted form of a generated document: what was produced, why,
//! and where it stands. State changes go through [`DocumentRecord::apply`],
//! which checks the transition table against the effective state and
//! appends to the transition log.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vidhi_core::{DocumentId, DocumentKind, JurisdictionId, Timestamp};
use vidhi_engine::{
    explain, ApplicationInput, CategoryMatch, ClauseDecision, ExplanationReport, GeneratedDocument,
    StructuredDocument, ValidationFinding, Verdict, VerdictResult,
};
use vidhi_rules::JurisdictionProfile;

use crate::deadline::{Deadlines, Urgency};
use crate::error::{LifecycleError, LifecycleResult};
use crate::state::{DocumentState, LifecycleEvent, TransitionRecord};

/// A generated document and its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub jurisdiction: JurisdictionId,
    pub input: ApplicationInput,
    pub matches: BTreeSet<CategoryMatch>,
    pub document: StructuredDocument,
    /// The clause decisions, in document order.
    pub decisions: Vec<ClauseDecision>,
    /// Warnings and advisories carried from validation.
    pub findings: Vec<ValidationFinding>,
    pub verdict: Verdict,
    pub rules_digest: String,
    pub created_at: Timestamp,
    /// The record this one appeals, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DocumentId>,
    state: DocumentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadlines: Option<Deadlines>,
    #[serde(default)]
    transitions: Vec<TransitionRecord>,
}

impl DocumentRecord {
    /// A `DRAFTED` record for a generated document.
    pub fn from_generated(generated: GeneratedDocument, parent_id: Option<DocumentId>) -> LifecycleResult<Self> {
        let jurisdiction = JurisdictionId::new(generated.input.jurisdiction.clone())?;
        Ok(Self {
            id: generated.id,
            kind: generated.input.kind,
            jurisdiction,
            matches: generated.matches,
            document: generated.document,
            decisions: generated.decisions,
            findings: generated.result.findings,
            verdict: generated.result.verdict,
            rules_digest: generated.rules_digest,
            created_at: generated.generated_at,
            input: generated.input,
            parent_id,
            state: DocumentState::Drafted,
            deadlines: None,
            transitions: Vec::new(),
        })
    }

    /// The stored state. May lag the effective state; see
    /// [`effective_state`](Self::effective_state).
    pub fn stored_state(&self) -> DocumentState {
        self.state
    }

    /// The state as of `now`: a submitted record whose reply deadline has
    /// passed reads as `DEADLINE_EXPIRED`.
    pub fn effective_state(&self, now: Timestamp) -> DocumentState {
        match (self.state, &self.deadlines) {
            (DocumentState::Submitted, Some(d)) if d.is_reply_overdue(now) => DocumentState::DeadlineExpired,
            (state, _) => state,
        }
    }

    pub fn deadlines(&self) -> Option<&Deadlines> {
        self.deadlines.as_ref()
    }

    /// Transition log, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// When the record entered its stored state.
    pub fn state_entered_at(&self) -> Timestamp {
        self.transitions.last().map_or(self.created_at, |t| t.timestamp)
    }

    /// Whole days until the reply deadline, `None` before submission or
    /// for kinds without one.
    pub fn days_remaining(&self, now: Timestamp) -> Option<i64> {
        self.deadlines.as_ref().map(|d| d.days_remaining(now))
    }

    pub fn urgency(&self, now: Timestamp) -> Option<Urgency> {
        self.days_remaining(now).map(Urgency::classify)
    }

    /// Rebuild the validation result the record was generated with.
    pub fn verdict_result(&self) -> VerdictResult {
        VerdictResult {
            verdict: self.verdict,
            findings: self.findings.clone(),
        }
    }

    pub fn explanation(&self) -> ExplanationReport {
        explain(&self.verdict_result(), &self.decisions)
    }

    /// Apply `event` at `now`. On `Submit` the deadlines are recomputed
    /// from `profile`. On error the record is unchanged.
    pub fn apply(
        &mut self,
        event: LifecycleEvent,
        now: Timestamp,
        profile: &JurisdictionProfile,
    ) -> LifecycleResult<DocumentState> {
        let from = self.effective_state(now);
        let to = from
            .after(self.kind, event)
            .ok_or(LifecycleError::InvalidTransition { from, event })?;

        if event == LifecycleEvent::Submit {
            self.deadlines = Deadlines::compute(self.kind, profile, now)?;
        }
        self.state = to;
        self.transitions.push(TransitionRecord {
            from_state: from,
            to_state: to,
            event,
            timestamp: now,
        });
        Ok(to)
    }
}
