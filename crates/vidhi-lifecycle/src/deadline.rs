//! # Statutory Deadlines
//!
//! Deadlines are derived from a single submission instant and the
//! jurisdiction's windows. They are computed, never edited: [`Deadlines`]
//! has no public mutators and is rebuilt on every submission.

use serde::{Deserialize, Serialize};
use vidhi_core::{DocumentKind, Timestamp, VidhiError};
use vidhi_rules::JurisdictionProfile;

/// Days below which a running deadline counts as urgent.
pub const URGENT_WITHIN_DAYS: i64 = 7;

/// Deadlines of one submitted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadlines {
    submitted_at: Timestamp,
    reply_deadline: Timestamp,
    appeal_deadline: Timestamp,
}

impl Deadlines {
    /// Deadlines for a document of `kind` submitted at `submitted_at`, or
    /// `None` for kinds without a reply clock.
    pub fn compute(
        kind: DocumentKind,
        profile: &JurisdictionProfile,
        submitted_at: Timestamp,
    ) -> Result<Option<Self>, VidhiError> {
        let Some(reply_days) = profile.reply_window_days(kind) else {
            return Ok(None);
        };
        let reply_deadline = submitted_at.plus_days(reply_days)?;
        let appeal_deadline = reply_deadline.plus_days(profile.appeal_filing_window_days())?;
        Ok(Some(Self {
            submitted_at,
            reply_deadline,
            appeal_deadline,
        }))
    }

    pub fn submitted_at(&self) -> Timestamp {
        self.submitted_at
    }

    /// The authority must reply by this instant.
    pub fn reply_deadline(&self) -> Timestamp {
        self.reply_deadline
    }

    /// Last instant to file a first appeal.
    pub fn appeal_deadline(&self) -> Timestamp {
        self.appeal_deadline
    }

    /// Whole days until the reply deadline, floored. Negative once passed.
    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        now.whole_days_until(self.reply_deadline)
    }

    pub fn is_reply_overdue(&self, now: Timestamp) -> bool {
        now > self.reply_deadline
    }

    /// A first appeal can no longer be filed after the appeal deadline.
    pub fn is_appeal_window_closed(&self, now: Timestamp) -> bool {
        now > self.appeal_deadline
    }

    pub fn due(&self, kind: DeadlineKind) -> Timestamp {
        match kind {
            DeadlineKind::Reply => self.reply_deadline,
            DeadlineKind::Appeal => self.appeal_deadline,
        }
    }
}

/// Which statutory deadline is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineKind {
    /// The authority's reply.
    Reply,
    /// Filing a first appeal.
    Appeal,
}

impl DeadlineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reply => "reply",
            Self::Appeal => "appeal",
        }
    }
}

impl std::fmt::Display for DeadlineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How pressing a running deadline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Expired,
    Urgent,
    Normal,
}

impl Urgency {
    /// Classify a days-remaining count: negative is expired, fewer than
    /// seven days is urgent.
    pub fn classify(days_remaining: i64) -> Self {
        if days_remaining < 0 {
            Self::Expired
        } else if days_remaining < URGENT_WITHIN_DAYS {
            Self::Urgent
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Urgent => "urgent",
            Self::Normal => "normal",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
