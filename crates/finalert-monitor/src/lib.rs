//! Logging setup for finalert.

mod logging;

pub use logging::{setup_logging, LOG_FILE_NAME};
