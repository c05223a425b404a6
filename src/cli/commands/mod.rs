//! CLI command implementations.

pub mod alert;
pub mod check;
pub mod notify;
pub mod run;
pub mod snapshot;
pub mod sources;
pub mod template;
pub mod validate;
