//! Shared reqwest client for the wiki REST API.
//!
//! Owns transport details only: endpoint construction under `api/v1`, the
//! bearer, tenant and trace headers, the request timeout and reading the
//! response body. Status interpretation belongs to each port adapter.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::dto::ErrorBodyDto;
use crate::domain::ports::RequestScope;

/// Header naming the tenant schema a request is scoped to.
pub const TENANT_HEADER: &str = "X-Tenant-ID";
/// Header carrying a per-request correlation identifier.
pub const TRACE_HEADER: &str = "X-Trace-Id";

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Errors raised while building the API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The configured base URL cannot carry a path.
    #[error("API base URL {0} cannot be used as a base")]
    InvalidBaseUrl(Url),
    /// reqwest refused the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Raw HTTP reply: status and body bytes.
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) body: Vec<u8>,
}

impl Reply {
    /// Decode a successful body.
    pub(crate) fn decode<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.body).map_err(|error| format!("invalid JSON payload: {error}"))
    }

    /// Server-supplied explanation of a failure, if any.
    pub(crate) fn detail(&self) -> Option<String> {
        serde_json::from_slice::<ErrorBodyDto>(&self.body)
            .ok()
            .and_then(|body| body.message())
    }

    /// Short description used when no detail is available.
    pub(crate) fn describe(&self) -> String {
        self.detail().map_or_else(
            || format!("status {}", self.status.as_u16()),
            |detail| format!("status {}: {detail}", self.status.as_u16()),
        )
    }
}

/// Cheaply cloneable handle over one reqwest connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client for `base` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiClientError> {
        if base.cannot_be_a_base() {
            return Err(ApiClientError::InvalidBaseUrl(base));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Absolute URL of an API endpoint. An empty final segment yields a
    /// trailing slash.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// Start a request carrying the scope's headers.
    pub(crate) fn request(&self, method: Method, url: Url, scope: &RequestScope) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(TRACE_HEADER, Uuid::new_v4().to_string());
        if let Some(token) = scope.token() {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(tenant) = scope.tenant() {
            builder = builder.header(TENANT_HEADER, tenant.as_str());
        }
        builder
    }

    /// Send `builder` and read the whole body.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Reply, reqwest::Error> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");
        let body = response.bytes().await?.to_vec();
        Ok(Reply { status, body })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for request construction; no network involved.
    use super::*;
    use crate::domain::{AccessToken, RoomName};
    use rstest::{fixture, rstest};

    #[fixture]
    fn api() -> ApiClient {
        let base = Url::parse("http://wiki.test:8000/").expect("base URL");
        ApiClient::new(base, Duration::from_secs(5)).expect("client")
    }

    #[rstest]
    #[case(&["pages", "by-slug", "setup"], "http://wiki.test:8000/api/v1/pages/by-slug/setup")]
    #[case(&["search", ""], "http://wiki.test:8000/api/v1/search/")]
    fn endpoints_live_under_api_prefix(
        api: ApiClient,
        #[case] segments: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(api.endpoint(segments).as_str(), expected);
    }

    #[rstest]
    fn base_path_is_preserved() {
        let base = Url::parse("https://example.org/wiki").expect("base URL");
        let api = ApiClient::new(base, Duration::from_secs(5)).expect("client");
        assert_eq!(
            api.endpoint(&["auth", "me"]).as_str(),
            "https://example.org/wiki/api/v1/auth/me"
        );
    }

    #[rstest]
    fn rejects_non_base_urls() {
        let base = Url::parse("mailto:ops@example.org").expect("URL");
        assert!(matches!(
            ApiClient::new(base, Duration::from_secs(5)),
            Err(ApiClientError::InvalidBaseUrl(_))
        ));
    }

    #[rstest]
    fn scoped_request_carries_auth_tenant_and_trace(api: ApiClient) {
        let token = AccessToken::new("secret").expect("token");
        let scope = RequestScope::for_room(&token, &RoomName::new("teamA").expect("room"));

        let request = api
            .request(Method::GET, api.endpoint(&["pages", "tree"]), &scope)
            .build()
            .expect("request");

        let headers = request.headers();
        assert_eq!(
            headers.get(reqwest::header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer secret")
        );
        assert_eq!(
            headers.get(TENANT_HEADER).and_then(|v| v.to_str().ok()),
            Some("teamA")
        );
        let trace = headers
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("trace header");
        assert!(Uuid::parse_str(trace).is_ok());
    }

    #[rstest]
    fn public_scope_sends_no_tenant(api: ApiClient) {
        let token = AccessToken::new("secret").expect("token");
        let scope = RequestScope::for_room(&token, &RoomName::public());
        let request = api
            .request(Method::GET, api.endpoint(&["pages", "tree"]), &scope)
            .build()
            .expect("request");
        assert!(request.headers().get(TENANT_HEADER).is_none());
    }

    #[rstest]
    fn anonymous_request_has_no_authorization(api: ApiClient) {
        let request = api
            .request(Method::GET, api.endpoint(&["public", "x"]), &RequestScope::anonymous())
            .build()
            .expect("request");
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[rstest]
    fn reply_describes_failures_with_detail() {
        let reply = Reply {
            status: StatusCode::BAD_REQUEST,
            body: br#"{"detail": "Email already registered"}"#.to_vec(),
        };
        assert_eq!(reply.describe(), "status 400: Email already registered");

        let reply = Reply {
            status: StatusCode::BAD_GATEWAY,
            body: b"<html>".to_vec(),
        };
        assert_eq!(reply.describe(), "status 502");
    }
}
