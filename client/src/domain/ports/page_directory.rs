//! Driven port for page identity lookups within a room.
//!
//! Lookups are pure queries: the client keeps no cache, so every call reaches
//! the server.

use async_trait::async_trait;

use super::{RequestScope, define_port_error};
use crate::domain::{PageId, PageRef, PageSlug, PageTreeNode};

define_port_error! {
    /// Errors surfaced by the page endpoints.
    pub enum PageDirectoryError {
        /// No page matches in the scoped room.
        NotFound => "page not found",
        /// The token is invalid or expired.
        Unauthorized => "token rejected by page directory",
        /// The caller may not read the scoped room.
        Forbidden { message: String } => "page access denied: {message}",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "page directory transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "page directory decode failed: {message}",
    }
}

/// Port for page identity and listing queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageDirectory: Send + Sync {
    /// Look a page up by slug.
    async fn page_by_slug(
        &self,
        scope: &RequestScope,
        slug: &PageSlug,
    ) -> Result<PageRef, PageDirectoryError>;

    /// Look a page up by identifier.
    async fn page_by_id(
        &self,
        scope: &RequestScope,
        id: PageId,
    ) -> Result<PageRef, PageDirectoryError>;

    /// The scoped room's page tree in display order.
    async fn page_tree(&self, scope: &RequestScope) -> Result<Vec<PageTreeNode>, PageDirectoryError>;
}
