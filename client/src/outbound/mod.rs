//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed adapters for the wiki REST API
//! - **token_file**: cap-std backed token persistence
//! - **history**: in-process browser history for the CLI and tests
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod history;
pub mod http;
pub mod token_file;

pub use history::MemoryHistory;
pub use token_file::FileTokenStore;
