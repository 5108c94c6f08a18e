//! Page id/slug resolution within a room.
//!
//! Both directions are idempotent lookups with no client-side cache. A
//! missing page and a failed request look the same to callers (`None`); the
//! cause is logged at debug level. A rejected token is the exception: the
//! `lookup_*` methods return it so the caller can end the session.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{PageDirectory, PageDirectoryError, RequestScope};
use crate::domain::{AccessToken, PageId, PageRef, PageSlug, RoomName};

/// Token refusal observed while resolving a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("token rejected by page directory")]
pub struct TokenRejected;

/// Resolver over the [`PageDirectory`] port.
#[derive(Clone)]
pub struct SlugResolver {
    pages: Arc<dyn PageDirectory>,
}

impl SlugResolver {
    /// Wrap a page directory.
    pub fn new(pages: Arc<dyn PageDirectory>) -> Self {
        Self { pages }
    }

    /// Resolve `slug` to the page it names in `room`.
    pub async fn resolve_slug_to_id(
        &self,
        token: &AccessToken,
        slug: &PageSlug,
        room: &RoomName,
    ) -> Option<PageRef> {
        self.lookup_slug(token, slug, room)
            .await
            .unwrap_or_else(|TokenRejected| {
                warn!(room = %room, slug = %slug, "token rejected during slug lookup");
                None
            })
    }

    /// Resolve page `id` to its slug in `room`.
    pub async fn resolve_id_to_slug(
        &self,
        token: &AccessToken,
        id: PageId,
        room: &RoomName,
    ) -> Option<PageSlug> {
        self.lookup_page_slug(token, id, room)
            .await
            .unwrap_or_else(|TokenRejected| {
                warn!(room = %room, page_id = %id, "token rejected during page lookup");
                None
            })
    }

    /// Like [`Self::resolve_slug_to_id`], but reports a rejected token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRejected`] when the server refuses the token.
    pub async fn lookup_slug(
        &self,
        token: &AccessToken,
        slug: &PageSlug,
        room: &RoomName,
    ) -> Result<Option<PageRef>, TokenRejected> {
        let scope = RequestScope::for_room(token, room);
        match self.pages.page_by_slug(&scope, slug).await {
            Ok(page) => Ok(Some(page)),
            Err(PageDirectoryError::Unauthorized) => Err(TokenRejected),
            Err(error) => {
                debug!(room = %room, slug = %slug, %error, "slug lookup failed");
                Ok(None)
            }
        }
    }

    /// Like [`Self::resolve_id_to_slug`], but reports a rejected token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRejected`] when the server refuses the token.
    pub async fn lookup_page_slug(
        &self,
        token: &AccessToken,
        id: PageId,
        room: &RoomName,
    ) -> Result<Option<PageSlug>, TokenRejected> {
        let scope = RequestScope::for_room(token, room);
        match self.pages.page_by_id(&scope, id).await {
            Ok(page) => Ok(Some(page.slug)),
            Err(PageDirectoryError::Unauthorized) => Err(TokenRejected),
            Err(error) => {
                debug!(room = %room, page_id = %id, %error, "page lookup failed");
                Ok(None)
            }
        }
    }
}
