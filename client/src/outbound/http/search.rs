//! Reqwest-backed search adapter.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::api_client::ApiClient;
use super::dto::SearchResponseDto;
use crate::domain::SearchHit;
use crate::domain::ports::{PageSearch, PageSearchError, RequestScope};

/// [`PageSearch`] over `search/?q=`.
#[derive(Debug, Clone)]
pub struct HttpPageSearch {
    api: ApiClient,
}

impl HttpPageSearch {
    /// Wrap a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSearch for HttpPageSearch {
    async fn search(
        &self,
        scope: &RequestScope,
        query: &str,
    ) -> Result<Vec<SearchHit>, PageSearchError> {
        let mut url = self.api.endpoint(&["search", ""]);
        url.query_pairs_mut().append_pair("q", query);
        let request = self.api.request(Method::GET, url, scope);
        let reply = self
            .api
            .execute(request)
            .await
            .map_err(|error| PageSearchError::transport(error.to_string()))?;
        match reply.status {
            status if status.is_success() => reply
                .decode::<SearchResponseDto>()
                .and_then(SearchResponseDto::into_hits)
                .map_err(PageSearchError::decode),
            StatusCode::UNAUTHORIZED => Err(PageSearchError::unauthorized()),
            _ => Err(PageSearchError::transport(reply.describe())),
        }
    }
}
