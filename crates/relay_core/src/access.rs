use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Approved,
    Blocked,
}

/// One allow-list entry, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub approved_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub status: UserStatus,
}

impl UserRecord {
    /// `None` when `now + days` falls outside the representable date range.
    pub fn approve(username: impl Into<String>, now: DateTime<Utc>, days: u32) -> Option<Self> {
        let expiry = now.checked_add_signed(TimeDelta::try_days(i64::from(days))?)?;
        Some(Self {
            username: username.into(),
            approved_at: now,
            expiry,
            status: UserStatus::Approved,
        })
    }

    /// Approved and not yet expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == UserStatus::Approved && now < self.expiry
    }
}
