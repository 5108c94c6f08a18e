//! Read-only view of a publicly shared room.
//!
//! Public requests carry neither a token nor a tenant header; the share slug
//! alone identifies the room.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{PublicRoomInfo, PublicShare, PublicShareError};
use crate::domain::{Error, PageId, PageTreeNode, PublicPage, first_listed_page};

fn map_share_error(error: PublicShareError) -> Error {
    match error {
        PublicShareError::NotFound => Error::not_found("this public link does not exist"),
        PublicShareError::Transport { .. } => Error::network(error.to_string()),
        PublicShareError::Decode { .. } => Error::internal(error.to_string()),
    }
}

/// Everything the public surface renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicView {
    /// Share slug from the URL.
    pub share: String,
    /// Room branding.
    pub info: PublicRoomInfo,
    /// Page tree in display order.
    pub tree: Vec<PageTreeNode>,
    /// Page being shown, if any.
    pub page: Option<PublicPage>,
}

/// Service loading public share data.
#[derive(Clone)]
pub struct PublicViewService {
    share: Arc<dyn PublicShare>,
}

impl PublicViewService {
    /// Wrap the public share port.
    pub fn new(share: Arc<dyn PublicShare>) -> Self {
        Self { share }
    }

    /// Load the shared room and show its first page.
    pub async fn open(&self, share: &str) -> Result<PublicView, Error> {
        let info = self.share.share_info(share).await.map_err(map_share_error)?;
        let tree = self.share.share_tree(share).await.map_err(map_share_error)?;
        let page = match first_listed_page(&tree) {
            Some(first) => Some(
                self.share
                    .share_page(share, first.id)
                    .await
                    .map_err(map_share_error)?,
            ),
            None => None,
        };
        debug!(share, pages = tree.len(), "public share opened");
        Ok(PublicView {
            share: share.to_owned(),
            info,
            tree,
            page,
        })
    }

    /// Load one page of the shared room.
    pub async fn open_page(&self, share: &str, page: PageId) -> Result<PublicPage, Error> {
        self.share
            .share_page(share, page)
            .await
            .map_err(map_share_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the public view.
    use super::*;
    use crate::domain::{ErrorCode, PageSlug};
    use async_trait::async_trait;
    use rstest::rstest;

    struct FixtureShare {
        tree: Vec<PageTreeNode>,
    }

    #[async_trait]
    impl PublicShare for FixtureShare {
        async fn share_info(&self, share: &str) -> Result<PublicRoomInfo, PublicShareError> {
            if share != "team-a" {
                return Err(PublicShareError::not_found());
            }
            Ok(PublicRoomInfo {
                display_name: "Team A".to_owned(),
                logo_url: None,
            })
        }

        async fn share_tree(&self, _share: &str) -> Result<Vec<PageTreeNode>, PublicShareError> {
            Ok(self.tree.clone())
        }

        async fn share_page(&self, _share: &str, page: PageId) -> Result<PublicPage, PublicShareError> {
            Ok(PublicPage {
                id: page,
                title: "Intro".to_owned(),
                slug: PageSlug::new("intro").expect("slug"),
                content: Some("{}".to_owned()),
            })
        }
    }

    fn node(id: i64) -> PageTreeNode {
        PageTreeNode {
            id: PageId::new(id),
            title: "Intro".to_owned(),
            slug: PageSlug::new("intro").expect("slug"),
            path: id.to_string(),
            children: Vec::new(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn open_shows_first_page() {
        let service = PublicViewService::new(Arc::new(FixtureShare {
            tree: vec![node(5), node(6)],
        }));

        let view = service.open("team-a").await.expect("view");

        assert_eq!(view.info.display_name, "Team A");
        assert_eq!(view.page.map(|page| page.id), Some(PageId::new(5)));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_share_has_no_page() {
        let service = PublicViewService::new(Arc::new(FixtureShare { tree: Vec::new() }));
        let view = service.open("team-a").await.expect("view");
        assert!(view.page.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_share_is_not_found() {
        let service = PublicViewService::new(Arc::new(FixtureShare { tree: Vec::new() }));
        let error = service.open("nope").await.expect_err("missing share");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
