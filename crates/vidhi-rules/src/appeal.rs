//! Appeal grounds, keyed by reason code.
//!
//! When a first appeal is derived from an RTI application, the reason code
//! chosen by the appellant selects the grievance statement, the numbered
//! grounds and the prayer. Each code also names the lifecycle condition
//! under which it can be raised: "no response" only after the reply
//! deadline has lapsed, the others only once a reply has been recorded.

use serde::{Deserialize, Serialize};

/// Lifecycle condition a reason code requires of the parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealTrigger {
    /// A reply was recorded.
    ReplyReceived,
    /// The reply deadline passed with no reply recorded.
    DeadlineExpired,
}

impl AppealTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplyReceived => "reply_received",
            Self::DeadlineExpired => "deadline_expired",
        }
    }
}

/// Grounds and prayer for one appeal reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealGround {
    /// Reason code, e.g. `no_response`.
    pub code: String,
    /// Short label for listings.
    pub label: String,
    pub requires: AppealTrigger,
    /// Completes the sentence "However, ...".
    pub statement: String,
    /// Numbered grounds of appeal.
    pub grounds: Vec<String>,
    pub prayer: String,
}
