//! Driven port for full-text page search.

use async_trait::async_trait;

use super::{RequestScope, define_port_error};
use crate::domain::SearchHit;

define_port_error! {
    /// Errors surfaced by the search endpoint.
    pub enum PageSearchError {
        /// The token is invalid or expired.
        Unauthorized => "token rejected by search",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "search transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "search decode failed: {message}",
    }
}

/// Port for searching pages of the scoped room.
#[async_trait]
pub trait PageSearch: Send + Sync {
    /// Run `query` (already trimmed, non-empty) and return ranked hits.
    async fn search(&self, scope: &RequestScope, query: &str) -> Result<Vec<SearchHit>, PageSearchError>;
}
