//! Driven port for the authentication endpoints.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{AccessToken, Credentials, UserProfile};

define_port_error! {
    /// Errors surfaced by the authentication endpoints.
    pub enum AuthGatewayError {
        /// Email/password pair was refused.
        InvalidCredentials => "invalid credentials",
        /// The server refused the request with an explanation.
        Rejected { message: String } => "request rejected: {message}",
        /// The token is invalid or expired.
        Unauthorized => "token rejected",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "auth transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "auth response decode failed: {message}",
    }
}

/// Port for exchanging credentials and validating tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, AuthGatewayError>;

    /// Create an account. Does not sign in.
    async fn register(&self, credentials: &Credentials) -> Result<(), AuthGatewayError>;

    /// Fetch the profile that owns `token`.
    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, AuthGatewayError>;
}
