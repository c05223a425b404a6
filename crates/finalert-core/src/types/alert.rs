//! Price threshold alerts.

use crate::error::ValidationError;
use crate::types::AssetClass;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Direction in which the price must cross the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    /// Trigger when the price is at or above the target
    Above,
    /// Trigger when the price is at or below the target
    Below,
}

impl AlertCondition {
    /// Check whether `current` satisfies the condition against `target`.
    pub fn is_met(&self, current: Decimal, target: Decimal) -> bool {
        match self {
            AlertCondition::Above => current >= target,
            AlertCondition::Below => current <= target,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "ABOVE"),
            AlertCondition::Below => write!(f, "BELOW"),
        }
    }
}

impl FromStr for AlertCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" | ">=" | "ustu" => Ok(AlertCondition::Above),
            "below" | "<=" | "alti" => Ok(AlertCondition::Below),
            _ => Err(ValidationError::UnknownCondition(s.to_string())),
        }
    }
}

/// Lifecycle state of an alert, derived from its stored flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    /// Waiting for the price to cross the target
    Active,
    /// Fired once; terminal
    Triggered,
    /// Removed by its owner before firing; terminal
    Deleted,
}

/// A persisted price alert.
///
/// Once `triggered_at` is set, `is_active` is false. An alert goes from
/// active to triggered at most once and is never reactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub asset_class: AssetClass,
    pub symbol: String,
    pub target_price: Decimal,
    pub condition: AlertCondition,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Get the lifecycle state.
    pub fn state(&self) -> AlertState {
        match (self.is_active, self.triggered_at) {
            (true, _) => AlertState::Active,
            (false, Some(_)) => AlertState::Triggered,
            (false, None) => AlertState::Deleted,
        }
    }

    /// Check whether an active alert fires at `current`.
    pub fn should_trigger(&self, current: Decimal) -> bool {
        self.is_active && self.condition.is_met(current, self.target_price)
    }

    /// Move to the triggered state. Returns false if the alert was not active.
    pub fn trigger(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.triggered_at = Some(at);
        true
    }

    /// Soft-delete. Returns false if the alert was not active.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        true
    }
}

/// Request to create an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlert {
    pub user_id: Uuid,
    pub asset_class: AssetClass,
    pub symbol: String,
    pub target_price: Decimal,
    pub condition: AlertCondition,
}

impl NewAlert {
    /// Validate and build the stored alert.
    pub fn into_alert(self, now: DateTime<Utc>) -> Result<Alert, ValidationError> {
        let symbol = self.asset_class.normalize_symbol(&self.symbol);
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if self.target_price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(self.target_price));
        }

        Ok(Alert {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            asset_class: self.asset_class,
            symbol,
            target_price: self.target_price,
            condition: self.condition,
            is_active: true,
            created_at: now,
            triggered_at: None,
        })
    }
}
