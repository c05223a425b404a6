//! Periodic alert evaluation and report delivery for finalert.
//!
//! This crate provides:
//! - `AlertEvaluator`: fires threshold alerts at most once
//! - `NotificationScheduler`: sends recurring market reports
//! - `PeriodicTask`: fixed-interval, non-overlapping runner for both
//! - `SubscriptionService`: alert and subscription management by chat identity
//! - Message and report formatting

mod evaluator;
mod manage;
pub mod report;
mod runner;
mod scheduler;
mod snapshots;
#[cfg(test)]
mod testing;

pub use evaluator::AlertEvaluator;
pub use manage::SubscriptionService;
pub use report::{format_alert_message, format_report, format_timestamp};
pub use runner::{Cycle, CycleStats, PeriodicTask};
pub use scheduler::NotificationScheduler;
