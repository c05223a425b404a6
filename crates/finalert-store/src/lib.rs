//! Persistence backends for finalert.
//!
//! Both backends implement the store traits from `finalert-core`:
//! - [`MemoryStore`]: volatile, for dry runs and tests
//! - [`JsonFileStore`]: a JSON document rewritten atomically on each change

mod json_file;
mod memory;
mod state;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
