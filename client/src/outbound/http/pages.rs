//! Reqwest-backed page directory adapter.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::api_client::{ApiClient, Reply};
use super::dto::{PageDto, PageTreeNodeDto, tree_from_dtos};
use crate::domain::ports::{PageDirectory, PageDirectoryError, RequestScope};
use crate::domain::{PageId, PageRef, PageSlug, PageTreeNode};

/// [`PageDirectory`] over the tenant-scoped `pages/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpPageDirectory {
    api: ApiClient,
}

impl HttpPageDirectory {
    /// Wrap a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn get(&self, segments: &[&str], scope: &RequestScope) -> Result<Reply, PageDirectoryError> {
        let request = self
            .api
            .request(Method::GET, self.api.endpoint(segments), scope);
        let reply = self
            .api
            .execute(request)
            .await
            .map_err(|error| PageDirectoryError::transport(error.to_string()))?;
        check_status(&reply)?;
        Ok(reply)
    }
}

#[async_trait]
impl PageDirectory for HttpPageDirectory {
    async fn page_by_slug(
        &self,
        scope: &RequestScope,
        slug: &PageSlug,
    ) -> Result<PageRef, PageDirectoryError> {
        self.get(&["pages", "by-slug", slug.as_str()], scope)
            .await?
            .decode::<PageDto>()
            .and_then(PageDto::into_page_ref)
            .map_err(PageDirectoryError::decode)
    }

    async fn page_by_id(
        &self,
        scope: &RequestScope,
        id: PageId,
    ) -> Result<PageRef, PageDirectoryError> {
        let segment = id.to_string();
        self.get(&["pages", segment.as_str()], scope)
            .await?
            .decode::<PageDto>()
            .and_then(PageDto::into_page_ref)
            .map_err(PageDirectoryError::decode)
    }

    async fn page_tree(&self, scope: &RequestScope) -> Result<Vec<PageTreeNode>, PageDirectoryError> {
        self.get(&["pages", "tree"], scope)
            .await?
            .decode::<Vec<PageTreeNodeDto>>()
            .and_then(tree_from_dtos)
            .map_err(PageDirectoryError::decode)
    }
}

fn check_status(reply: &Reply) -> Result<(), PageDirectoryError> {
    match reply.status {
        status if status.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(PageDirectoryError::not_found()),
        StatusCode::UNAUTHORIZED => Err(PageDirectoryError::unauthorized()),
        StatusCode::FORBIDDEN => Err(PageDirectoryError::forbidden(reply.describe())),
        _ => Err(PageDirectoryError::transport(reply.describe())),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network status mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::NOT_FOUND, PageDirectoryError::not_found())]
    #[case(StatusCode::UNAUTHORIZED, PageDirectoryError::unauthorized())]
    #[case(StatusCode::FORBIDDEN, PageDirectoryError::forbidden("status 403"))]
    #[case(StatusCode::BAD_GATEWAY, PageDirectoryError::transport("status 502"))]
    fn statuses_map_to_port_errors(#[case] status: StatusCode, #[case] expected: PageDirectoryError) {
        let reply = Reply {
            status,
            body: Vec::new(),
        };
        assert_eq!(check_status(&reply), Err(expected));
    }

    #[rstest]
    fn page_payload_maps_to_reference() {
        let reply = Reply {
            status: StatusCode::OK,
            body: br#"{"id": 7, "slug": "setup", "title": "Setup", "content": null}"#.to_vec(),
        };
        let page = reply
            .decode::<PageDto>()
            .and_then(PageDto::into_page_ref)
            .expect("page");
        assert_eq!(page.id, PageId::new(7));
        assert_eq!(page.slug.as_str(), "setup");
    }
}
