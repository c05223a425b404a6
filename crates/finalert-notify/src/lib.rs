//! Message delivery for finalert.

mod log;
mod telegram;

pub use log::LogMessenger;
pub use telegram::{TelegramConfig, TelegramMessenger, DEFAULT_API_BASE, DEFAULT_TOKEN_ENV};
