//! Error types for finalert.

use crate::types::AssetClass;
use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum FinAlertError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    EmptySnapshot(#[from] EmptySnapshotError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single fetcher against its upstream source.
///
/// Every variant carries the label of the source that failed so the
/// fallback chain can log it. None of these are fatal: the chain moves on
/// to the next fetcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{origin}: network error: {message}")]
    Network { origin: String, message: String },

    #[error("{origin}: request timed out after {timeout_ms}ms")]
    Timeout { origin: String, timeout_ms: u64 },

    #[error("{origin}: upstream returned HTTP {status}")]
    Status { origin: String, status: u16 },

    #[error("{origin}: unparseable payload: {message}")]
    Parse { origin: String, message: String },
}

impl FetchError {
    pub fn network(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Label of the source that produced this error.
    pub fn origin(&self) -> &str {
        match self {
            FetchError::Network { origin, .. }
            | FetchError::Timeout { origin, .. }
            | FetchError::Status { origin, .. }
            | FetchError::Parse { origin, .. } => origin,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Every fetcher of a chain, including the last resort, came back empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no {asset_class} data: every source failed (last resort: {fallback})")]
pub struct EmptySnapshotError {
    pub asset_class: AssetClass,
    pub fallback: String,
}

/// Persistence collaborator errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

/// Outbound messaging errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Message rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Domain validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Bid {bid} is above ask {ask}")]
    CrossedQuote { bid: Decimal, ask: Decimal },

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("At least one asset class is required")]
    EmptyAssetClasses,

    #[error("Unknown asset class: {0}")]
    UnknownAssetClass(String),

    #[error("Unknown interval: {0}")]
    UnknownInterval(String),

    #[error("Unknown alert condition: {0}")]
    UnknownCondition(String),
}

/// Result type alias for finalert operations.
pub type FinAlertResult<T> = Result<T, FinAlertError>;
