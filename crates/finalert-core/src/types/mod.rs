//! Core data types.

mod alert;
mod asset;
mod notification;
mod quote;
mod snapshot;
mod user;

pub use alert::{Alert, AlertCondition, AlertState, NewAlert};
pub use asset::AssetClass;
pub use notification::{IntervalKind, NewNotification, RecurringNotification};
pub use quote::{AssetQuote, QuoteMap};
pub use snapshot::{Provenance, Snapshot};
pub use user::User;
