//! Driven port for the unauthenticated public sharing endpoints.

use async_trait::async_trait;
use serde::Serialize;

use super::define_port_error;
use crate::domain::{PageId, PageTreeNode, PublicPage};

/// Branding of a shared room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicRoomInfo {
    /// Label shown in the header.
    pub display_name: String,
    /// Server-relative logo path.
    pub logo_url: Option<String>,
}

define_port_error! {
    /// Errors surfaced by the public sharing endpoints.
    pub enum PublicShareError {
        /// The share slug or page does not exist.
        NotFound => "public link not found",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "public share transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "public share decode failed: {message}",
    }
}

/// Port for the read-only public view. Requests carry no token and no tenant.
#[async_trait]
pub trait PublicShare: Send + Sync {
    /// Branding of the room published under `share`.
    async fn share_info(&self, share: &str) -> Result<PublicRoomInfo, PublicShareError>;

    /// Page tree of the room published under `share`.
    async fn share_tree(&self, share: &str) -> Result<Vec<PageTreeNode>, PublicShareError>;

    /// One page of the room published under `share`.
    async fn share_page(&self, share: &str, page: PageId) -> Result<PublicPage, PublicShareError>;
}
