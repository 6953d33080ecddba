//! # Document States
//!
//! ## Transitions
//!
//! ```text
//! Drafted ──submit──▶ Submitted ──record_reply──▶ ReplyReceived ──┐
//!                        │  │                                     │
//!                        │  └─(reply deadline passes)─▶ DeadlineExpired
//!                        │                                │       │
//!                        │               record_reply ◀───┘  file_appeal
//!                        │                                        ▼
//!                        └──────────close──────────▶ Closed ◀── AppealFiled
//! ```
//!
//! `DeadlineExpired` is never stored. It is derived when a record is read
//! after its reply deadline with no reply recorded. Affidavits have no reply clock and only
//! go `Drafted → Submitted → Closed`.

use serde::{Deserialize, Serialize};
use vidhi_core::{DocumentKind, Timestamp};

/// Lifecycle state of a document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentState {
    /// Generated, not yet filed.
    Drafted,
    /// Filed; the reply clock is running.
    Submitted,
    /// A reply was recorded.
    ReplyReceived,
    /// Derived: the reply deadline passed with no reply recorded.
    DeadlineExpired,
    /// A first appeal was generated against this record.
    AppealFiled,
    /// Terminal.
    Closed,
}

impl DocumentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drafted => "DRAFTED",
            Self::Submitted => "SUBMITTED",
            Self::ReplyReceived => "REPLY_RECEIVED",
            Self::DeadlineExpired => "DEADLINE_EXPIRED",
            Self::AppealFiled => "APPEAL_FILED",
            Self::Closed => "CLOSED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether a first appeal may be derived from a record in this state.
    pub fn is_appealable(&self) -> bool {
        matches!(self, Self::ReplyReceived | Self::DeadlineExpired)
    }

    /// The state `event` leads to from `self` for a document of `kind`,
    /// or `None` when the transition is not allowed. `self` is the
    /// effective state, so `DeadlineExpired` is a valid source.
    pub fn after(self, kind: DocumentKind, event: LifecycleEvent) -> Option<DocumentState> {
        use DocumentState::*;
        use LifecycleEvent::*;

        let tracks_reply = kind.has_reply_deadline();
        match (self, event) {
            (Drafted, Submit) => Some(Submitted),
            (Submitted | DeadlineExpired, RecordReply) if tracks_reply => Some(ReplyReceived),
            (ReplyReceived | DeadlineExpired, FileAppeal) if kind == DocumentKind::RtiApplication => {
                Some(AppealFiled)
            }
            (Submitted, Close) => Some(Closed),
            (ReplyReceived | DeadlineExpired | AppealFiled, Close) if tracks_reply => Some(Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event that moves a record between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The party confirms the document was filed.
    Submit,
    /// The authority's reply arrived.
    RecordReply,
    /// A first appeal was generated. Raised only by appeal generation.
    FileAppeal,
    /// The matter is closed.
    Close,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::RecordReply => "record_reply",
            Self::FileAppeal => "file_appeal",
            Self::Close => "close",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a record's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Effective state before the event.
    pub from_state: DocumentState,
    pub to_state: DocumentState,
    pub event: LifecycleEvent,
    pub timestamp: Timestamp,
}
