//! Reqwest-backed public sharing adapter.
//!
//! Requests are anonymous and carry no tenant header.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::api_client::{ApiClient, Reply};
use super::dto::{PageTreeNodeDto, PublicInfoDto, PublicPageDto, tree_from_dtos};
use crate::domain::ports::{PublicRoomInfo, PublicShare, PublicShareError, RequestScope};
use crate::domain::{PageId, PageTreeNode, PublicPage};

/// [`PublicShare`] over `public/{slug}`.
#[derive(Debug, Clone)]
pub struct HttpPublicShare {
    api: ApiClient,
}

impl HttpPublicShare {
    /// Wrap a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn get(&self, segments: &[&str]) -> Result<Reply, PublicShareError> {
        let request = self.api.request(
            Method::GET,
            self.api.endpoint(segments),
            &RequestScope::anonymous(),
        );
        let reply = self
            .api
            .execute(request)
            .await
            .map_err(|error| PublicShareError::transport(error.to_string()))?;
        match reply.status {
            status if status.is_success() => Ok(reply),
            StatusCode::NOT_FOUND => Err(PublicShareError::not_found()),
            _ => Err(PublicShareError::transport(reply.describe())),
        }
    }
}

#[async_trait]
impl PublicShare for HttpPublicShare {
    async fn share_info(&self, share: &str) -> Result<PublicRoomInfo, PublicShareError> {
        self.get(&["public", share])
            .await?
            .decode::<PublicInfoDto>()
            .map(PublicRoomInfo::from)
            .map_err(PublicShareError::decode)
    }

    async fn share_tree(&self, share: &str) -> Result<Vec<PageTreeNode>, PublicShareError> {
        self.get(&["public", share, "tree"])
            .await?
            .decode::<Vec<PageTreeNodeDto>>()
            .and_then(tree_from_dtos)
            .map_err(PublicShareError::decode)
    }

    async fn share_page(&self, share: &str, page: PageId) -> Result<PublicPage, PublicShareError> {
        let segment = page.to_string();
        self.get(&["public", share, "page", segment.as_str()])
            .await?
            .decode::<PublicPageDto>()
            .and_then(PublicPageDto::into_page)
            .map_err(PublicShareError::decode)
    }
}
