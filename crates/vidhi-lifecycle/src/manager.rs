//! # Lifecycle Manager
//!
//! Owns the record store and applies lifecycle events. Mutations of one
//! record are serialized by a per-record lock; different records proceed
//! independently. Every operation reads the store, applies the change to
//! a copy, and writes the copy back only on success. A lock entry lives
//! only while some operation holds or waits on it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vidhi_core::{Clock, DocumentId, DocumentKind, JurisdictionId, Timestamp};
use vidhi_engine::{DocumentEngine, GeneratedDocument, GenerationOutcome};
use vidhi_rules::RuleSet;

use crate::appeal::{appeal_input, ineligibility};
use crate::deadline::{DeadlineKind, Urgency};
use crate::error::{LifecycleError, LifecycleResult};
use crate::record::DocumentRecord;
use crate::state::{DocumentState, LifecycleEvent};
use crate::store::RecordStore;

/// A running deadline, as listed by
/// [`LifecycleManager::pending_deadlines`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeadline {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub jurisdiction: JurisdictionId,
    pub deadline: DeadlineKind,
    pub due: Timestamp,
    pub days_remaining: i64,
    pub urgency: Urgency,
}

pub struct LifecycleManager {
    engine: DocumentEngine,
    store: Arc<dyn RecordStore>,
    locks: Mutex<HashMap<DocumentId, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl LifecycleManager {
    pub fn new(engine: DocumentEngine, store: Arc<dyn RecordStore>) -> Self {
        Self {
            engine,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &DocumentEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn now(&self) -> Timestamp {
        self.engine.clock().now()
    }

    /// Run `op` holding the lock of record `id`.
    fn with_record_lock<T>(&self, id: &DocumentId, op: impl FnOnce() -> LifecycleResult<T>) -> LifecycleResult<T> {
        let lock = Arc::clone(self.locks.lock().entry(id.clone()).or_default());
        let result = {
            let _guard = lock.lock();
            op()
        };
        drop(lock);

        // New holders clone under the map lock, so a count of one here
        // means nobody else holds or waits on this entry.
        let mut locks = self.locks.lock();
        if locks.get(id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(id);
        }
        result
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().len()
    }

    /// Store a `DRAFTED` record for a generated document.
    pub fn create_record(
        &self,
        generated: GeneratedDocument,
        parent_id: Option<DocumentId>,
    ) -> LifecycleResult<DocumentRecord> {
        let id = generated.id.clone();
        self.with_record_lock(&id, || {
            if self.store.get(&generated.id)?.is_some() {
                return Err(LifecycleError::DuplicateRecord(generated.id));
            }
            let record = DocumentRecord::from_generated(generated, parent_id)?;
            self.store.put(record.clone())?;

            tracing::info!(document = %record.id, kind = %record.kind, state = %record.stored_state(), "record created");
            Ok(record)
        })
    }

    pub fn get(&self, id: &DocumentId) -> LifecycleResult<DocumentRecord> {
        self.store
            .get(id)?
            .ok_or_else(|| LifecycleError::RecordNotFound(id.clone()))
    }

    /// All stored records, ordered by id.
    pub fn records(&self) -> LifecycleResult<Vec<DocumentRecord>> {
        Ok(self.store.list()?)
    }

    pub fn effective_state(&self, id: &DocumentId) -> LifecycleResult<DocumentState> {
        Ok(self.get(id)?.effective_state(self.now()))
    }

    /// Apply `event` to the record `id` at the clock's current instant.
    ///
    /// `FileAppeal` is only raised by [`generate_appeal`](Self::generate_appeal).
    pub fn transition(&self, id: &DocumentId, event: LifecycleEvent) -> LifecycleResult<DocumentRecord> {
        self.with_record_lock(id, || {
            let mut record = self.get(id)?;
            let now = self.now();
            if event == LifecycleEvent::FileAppeal {
                return Err(LifecycleError::InvalidTransition {
                    from: record.effective_state(now),
                    event,
                });
            }
            let rules = self.engine.rules().snapshot();
            self.apply(&rules, &mut record, event, now)?;
            self.store.put(record.clone())?;
            Ok(record)
        })
    }

    pub fn submit(&self, id: &DocumentId) -> LifecycleResult<DocumentRecord> {
        self.transition(id, LifecycleEvent::Submit)
    }

    pub fn record_reply(&self, id: &DocumentId) -> LifecycleResult<DocumentRecord> {
        self.transition(id, LifecycleEvent::RecordReply)
    }

    pub fn close(&self, id: &DocumentId) -> LifecycleResult<DocumentRecord> {
        self.transition(id, LifecycleEvent::Close)
    }

    fn apply(
        &self,
        rules: &RuleSet,
        record: &mut DocumentRecord,
        event: LifecycleEvent,
        now: Timestamp,
    ) -> LifecycleResult<DocumentState> {
        let profile = rules
            .jurisdiction(record.jurisdiction.as_str())
            .ok_or_else(|| LifecycleError::UnknownJurisdiction(record.jurisdiction.to_string()))?;
        let from = record.effective_state(now);
        let to = match record.apply(event, now, profile) {
            Ok(to) => to,
            Err(e) => {
                tracing::warn!(document = %record.id, %from, %event, "transition rejected");
                return Err(e);
            }
        };

        tracing::info!(document = %record.id, %from, %to, %event, "lifecycle transition");
        metrics::counter!(
            "vidhi_lifecycle_transitions_total",
            "event" => event.as_str(),
            "to" => to.as_str()
        )
        .increment(1);
        Ok(to)
    }

    /// Generate a first appeal against `parent_id` for `reason_code`.
    ///
    /// The parent must be an RTI application whose effective state is the
    /// one the reason requires, inside its appeal window, with no appeal
    /// filed yet. The derived input runs through the full pipeline; on
    /// success the appeal record is stored with a link to its parent and
    /// the parent moves to `APPEAL_FILED`.
    ///
    /// If an earlier call stored the appeal but failed to update the
    /// parent, the parent is moved to `APPEAL_FILED` now and the stored
    /// appeal is returned.
    pub fn generate_appeal(&self, parent_id: &DocumentId, reason_code: &str) -> LifecycleResult<DocumentRecord> {
        self.with_record_lock(parent_id, || {
            let mut parent = self.get(parent_id)?;
            let rules = self.engine.rules().snapshot();
            let now = self.now();

            let ground = rules
                .appeal_ground(reason_code)
                .ok_or_else(|| LifecycleError::UnknownAppealReason(reason_code.to_string()))?;
            if let Some(existing) = self.store.list_by_parent(parent_id)?.into_iter().next() {
                if parent.stored_state() == DocumentState::AppealFiled {
                    return Err(LifecycleError::IneligibleForAppeal {
                        id: parent_id.clone(),
                        reason: format!("appeal {} already filed", existing.id),
                    });
                }
                self.apply(&rules, &mut parent, LifecycleEvent::FileAppeal, now)?;
                self.store.put(parent)?;
                tracing::warn!(document = %existing.id, parent = %parent_id, "completed an interrupted appeal filing");
                return Ok(existing);
            }
            if let Some(reason) = ineligibility(&parent, ground, now) {
                return Err(LifecycleError::IneligibleForAppeal {
                    id: parent_id.clone(),
                    reason,
                });
            }

            let input = appeal_input(&parent, reason_code, self.engine.clock().today());
            let generated = match self.engine.generate(&input)? {
                GenerationOutcome::Generated(doc) => *doc,
                GenerationOutcome::Blocked(assessment) => {
                    return Err(LifecycleError::AppealBlocked {
                        findings: assessment.result.findings,
                    })
                }
            };
            if self.store.get(&generated.id)?.is_some() {
                return Err(LifecycleError::DuplicateRecord(generated.id));
            }

            let appeal = DocumentRecord::from_generated(generated, Some(parent_id.clone()))?;
            self.apply(&rules, &mut parent, LifecycleEvent::FileAppeal, now)?;
            self.store.put(appeal.clone())?;
            self.store.put(parent)?;

            tracing::info!(document = %appeal.id, parent = %parent_id, reason = %ground.code, "appeal generated");
            Ok(appeal)
        })
    }

    /// Whole days until the reply deadline of `id` at `now`.
    pub fn days_remaining(&self, id: &DocumentId, now: Timestamp) -> LifecycleResult<Option<i64>> {
        Ok(self.get(id)?.days_remaining(now))
    }

    pub fn urgency(&self, id: &DocumentId, now: Timestamp) -> LifecycleResult<Option<Urgency>> {
        Ok(self.get(id)?.urgency(now))
    }

    /// Deadlines still running at `now`, soonest first: the reply
    /// deadline of submitted records, and the appeal deadline of records
    /// that were answered or whose reply deadline lapsed.
    pub fn pending_deadlines(&self, now: Timestamp) -> LifecycleResult<Vec<PendingDeadline>> {
        let mut pending: Vec<PendingDeadline> = self
            .store
            .list()?
            .into_iter()
            .filter_map(|r| {
                let deadline = match r.effective_state(now) {
                    DocumentState::Submitted => DeadlineKind::Reply,
                    DocumentState::ReplyReceived | DocumentState::DeadlineExpired => DeadlineKind::Appeal,
                    _ => return None,
                };
                let due = r.deadlines()?.due(deadline);
                let days_remaining = now.whole_days_until(due);
                if days_remaining < 0 {
                    return None;
                }
                Some(PendingDeadline {
                    id: r.id,
                    kind: r.kind,
                    jurisdiction: r.jurisdiction,
                    deadline,
                    due,
                    days_remaining,
                    urgency: Urgency::classify(days_remaining),
                })
            })
            .collect();
        pending.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));
        Ok(pending)
    }
}
