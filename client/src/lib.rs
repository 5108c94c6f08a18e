//! Navigation core of the wiki client.
//!
//! Keeps the authenticated session, the active room, the selected page and
//! the browser URL consistent with one another. The [`app::WikiApp`] shell is
//! the entry point; [`domain`] holds the state machine and its ports and
//! [`outbound`] the adapters for the REST API, token storage and history.

pub mod app;
pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{View, WikiApp, WikiPorts};
pub use config::ClientSettings;
