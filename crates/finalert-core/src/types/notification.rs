//! Recurring market report subscriptions.

use crate::error::ValidationError;
use crate::types::AssetClass;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How often a recurring report is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    /// Every hour
    #[default]
    Hourly,
    /// Every 4 hours
    #[serde(rename = "every_4h")]
    Every4h,
    /// Every 8 hours
    #[serde(rename = "every_8h")]
    Every8h,
    /// Once a day
    Daily,
}

impl IntervalKind {
    /// Get the interval duration in seconds.
    pub fn as_secs(&self) -> i64 {
        match self {
            IntervalKind::Hourly => 3_600,
            IntervalKind::Every4h => 14_400,
            IntervalKind::Every8h => 28_800,
            IntervalKind::Daily => 86_400,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.as_secs())
    }

    /// Check whether a report is due. A report that was never sent is due now.
    pub fn is_due(&self, last_sent_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_sent_at {
            None => true,
            Some(last) => now - last >= self.duration(),
        }
    }

    /// Get all interval kinds.
    pub fn all() -> &'static [IntervalKind] {
        &[
            IntervalKind::Hourly,
            IntervalKind::Every4h,
            IntervalKind::Every8h,
            IntervalKind::Daily,
        ]
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntervalKind::Hourly => "hourly",
            IntervalKind::Every4h => "every_4h",
            IntervalKind::Every8h => "every_8h",
            IntervalKind::Daily => "daily",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for IntervalKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" | "1h" | "her_saat" => Ok(IntervalKind::Hourly),
            "every_4h" | "4h" | "her_4_saat" => Ok(IntervalKind::Every4h),
            "every_8h" | "8h" | "her_8_saat" => Ok(IntervalKind::Every8h),
            "daily" | "1d" | "gunluk" => Ok(IntervalKind::Daily),
            _ => Err(ValidationError::UnknownInterval(s.to_string())),
        }
    }
}

/// A persisted recurring report subscription.
///
/// `last_sent_at` never moves backwards once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub interval: IntervalKind,
    pub asset_classes: BTreeSet<AssetClass>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_sent_at: Option<DateTime<Utc>>,
}

impl RecurringNotification {
    /// Check whether an active subscription is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.interval.is_due(self.last_sent_at, now)
    }

    /// Record a send. Earlier timestamps than the stored one are ignored.
    pub fn record_sent(&mut self, at: DateTime<Utc>) {
        self.last_sent_at = Some(match self.last_sent_at {
            Some(previous) if previous > at => previous,
            _ => at,
        });
    }

    /// Soft-delete. Returns false if already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        true
    }
}

/// Request to create a recurring notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub interval: IntervalKind,
    pub asset_classes: BTreeSet<AssetClass>,
}

impl NewNotification {
    /// Validate and build the stored notification.
    pub fn into_notification(
        self,
        now: DateTime<Utc>,
    ) -> Result<RecurringNotification, ValidationError> {
        if self.asset_classes.is_empty() {
            return Err(ValidationError::EmptyAssetClasses);
        }

        Ok(RecurringNotification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            interval: self.interval,
            asset_classes: self.asset_classes,
            is_active: true,
            created_at: now,
            last_sent_at: None,
        })
    }
}
