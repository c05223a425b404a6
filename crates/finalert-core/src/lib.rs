//! Core types and traits for finalert.
//!
//! This crate provides the building blocks shared by every other crate:
//! - Market data types (AssetClass, AssetQuote, Snapshot, Provenance)
//! - Persisted entities (Alert, RecurringNotification, User)
//! - Locale-aware price parsing and formatting
//! - Collaborator traits for fetchers, market data, persistence, and messaging

pub mod error;
pub mod price;
pub mod text;
pub mod traits;
pub mod types;

pub use error::{
    EmptySnapshotError, FetchError, FinAlertError, FinAlertResult, PersistenceError, SendError,
    ValidationError,
};
pub use price::{format_percent, format_price, parse_price, try_parse_price};
pub use traits::*;
pub use types::*;
