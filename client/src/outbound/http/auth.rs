//! Reqwest-backed authentication adapter.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::json;

use super::api_client::{ApiClient, Reply};
use super::dto::{TokenDto, UserDto};
use crate::domain::ports::{AuthGateway, AuthGatewayError, RequestScope};
use crate::domain::{AccessToken, Credentials, UserProfile};

/// [`AuthGateway`] over `auth/login`, `auth/register` and `auth/me`.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    api: ApiClient,
}

impl HttpAuthGateway {
    /// Wrap a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, AuthGatewayError> {
        let request = self
            .api
            .request(
                Method::POST,
                self.api.endpoint(&["auth", "login"]),
                &RequestScope::anonymous(),
            )
            .form(&[
                ("username", credentials.email()),
                ("password", credentials.password()),
            ]);
        let reply = self.api.execute(request).await.map_err(map_transport_error)?;
        if !reply.status.is_success() {
            return Err(map_login_status(&reply));
        }
        reply
            .decode::<TokenDto>()
            .and_then(TokenDto::into_token)
            .map_err(AuthGatewayError::decode)
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), AuthGatewayError> {
        let request = self
            .api
            .request(
                Method::POST,
                self.api.endpoint(&["auth", "register"]),
                &RequestScope::anonymous(),
            )
            .json(&json!({
                "email": credentials.email(),
                "password": credentials.password(),
            }));
        let reply = self.api.execute(request).await.map_err(map_transport_error)?;
        if reply.status.is_success() {
            return Ok(());
        }
        if reply.status.is_client_error() {
            return Err(AuthGatewayError::rejected(
                reply
                    .detail()
                    .unwrap_or_else(|| "registration rejected".to_owned()),
            ));
        }
        Err(AuthGatewayError::transport(reply.describe()))
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, AuthGatewayError> {
        let request = self.api.request(
            Method::GET,
            self.api.endpoint(&["auth", "me"]),
            &RequestScope::authenticated(token),
        );
        let reply = self.api.execute(request).await.map_err(map_transport_error)?;
        match reply.status {
            status if status.is_success() => reply
                .decode::<UserDto>()
                .map(UserProfile::from)
                .map_err(AuthGatewayError::decode),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthGatewayError::unauthorized())
            }
            _ => Err(AuthGatewayError::transport(reply.describe())),
        }
    }
}

fn map_login_status(reply: &Reply) -> AuthGatewayError {
    match reply.status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            AuthGatewayError::invalid_credentials()
        }
        status if status.is_client_error() => AuthGatewayError::rejected(reply.describe()),
        _ => AuthGatewayError::transport(reply.describe()),
    }
}

fn map_transport_error(error: reqwest::Error) -> AuthGatewayError {
    AuthGatewayError::transport(error.to_string())
}
