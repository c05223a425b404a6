//! Collaborator traits.

mod fetcher;
mod market_data;
mod messenger;
mod store;

pub use fetcher::Fetcher;
pub use market_data::MarketData;
pub use messenger::Messenger;
pub use store::{AlertStore, NotificationStore, Store, UserStore};
