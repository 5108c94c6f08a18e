//! Session store: the token, the current user and the auth lifecycle.
//!
//! The store gates everything else. It persists the bearer token through the
//! [`TokenStore`] port so a restart can restore the session, and it is the
//! only component allowed to destroy a session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ports::{AuthGateway, AuthGatewayError, TokenStore, TokenStoreError};
use crate::domain::{
    AccessToken, Credentials, CredentialsValidationError, Error, Session, UserProfile,
};

/// Failures reported by the session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Email or password failed local validation; nothing was sent.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CredentialsValidationError),
    /// The server refused the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The server refused the request and explained why.
    #[error("{reason}")]
    Rejected {
        /// Explanation returned by the server.
        reason: String,
    },
    /// The token was refused.
    #[error("session expired")]
    Unauthorized,
    /// The account exists but is disabled.
    #[error("account is inactive")]
    Inactive,
    /// The server could not be reached.
    #[error("network error: {message}")]
    Network {
        /// Transport failure detail.
        message: String,
    },
    /// The server answered with something unreadable.
    #[error("unexpected response: {message}")]
    Protocol {
        /// Decoding failure detail.
        message: String,
    },
    /// The persisted token could not be read or written.
    #[error("token storage failed: {message}")]
    Storage {
        /// I/O failure detail.
        message: String,
    },
}

impl From<AuthGatewayError> for SessionError {
    fn from(error: AuthGatewayError) -> Self {
        match error {
            AuthGatewayError::InvalidCredentials => Self::InvalidCredentials,
            AuthGatewayError::Rejected { message } => Self::Rejected { reason: message },
            AuthGatewayError::Unauthorized => Self::Unauthorized,
            AuthGatewayError::Transport { message } => Self::Network { message },
            AuthGatewayError::Decode { message } => Self::Protocol { message },
        }
    }
}

impl From<TokenStoreError> for SessionError {
    fn from(error: TokenStoreError) -> Self {
        match error {
            TokenStoreError::Io { message } => Self::Storage { message },
        }
    }
}

impl From<SessionError> for Error {
    fn from(error: SessionError) -> Self {
        let message = error.to_string();
        match error {
            SessionError::InvalidInput(_) | SessionError::Rejected { .. } => {
                Error::invalid_request(message)
            }
            SessionError::InvalidCredentials | SessionError::Unauthorized => {
                Error::unauthorized(message)
            }
            SessionError::Inactive => Error::forbidden(message),
            SessionError::Network { .. } => Error::network(message),
            SessionError::Protocol { .. } | SessionError::Storage { .. } => {
                Error::internal(message)
            }
        }
    }
}

/// Owner of the authenticated session.
pub struct SessionStore {
    gateway: Arc<dyn AuthGateway>,
    tokens: Arc<dyn TokenStore>,
    session: Option<Session>,
    loading: bool,
}

impl SessionStore {
    /// Build the store. `is_loading` is true until [`Self::restore`] runs
    /// whenever a persisted token exists.
    pub fn new(gateway: Arc<dyn AuthGateway>, tokens: Arc<dyn TokenStore>) -> Self {
        let loading = match tokens.load() {
            Ok(token) => token.is_some(),
            Err(error) => {
                warn!(%error, "persisted token unreadable");
                false
            }
        };
        Self {
            gateway,
            tokens,
            session: None,
            loading,
        }
    }

    /// Current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Bearer token of the current session.
    pub fn token(&self) -> Option<&AccessToken> {
        self.session.as_ref().map(Session::token)
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a persisted token is still being validated.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Validate the persisted token, if any. Any failure logs out.
    pub async fn restore(&mut self) -> Result<(), SessionError> {
        let stored = match self.tokens.load() {
            Ok(stored) => stored,
            Err(error) => {
                self.loading = false;
                return Err(error.into());
            }
        };
        let Some(token) = stored else {
            self.loading = false;
            return Ok(());
        };

        match self.gateway.current_user(&token).await {
            Ok(profile) if profile.is_active => {
                debug!(user_id = %profile.id, "session restored");
                self.session = Some(Session::new(profile, token));
                self.loading = false;
            }
            Ok(profile) => {
                info!(user_id = %profile.id, "stored token belongs to an inactive account");
                self.logout();
            }
            Err(error) => {
                info!(%error, "stored token rejected");
                self.logout();
            }
        }
        Ok(())
    }

    /// Exchange credentials for a token, persist it and load the profile.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials::try_from_parts(email, password)?;
        let token = self.gateway.login(&credentials).await?;
        let profile = self.gateway.current_user(&token).await?;
        self.establish(profile, token)
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials::try_from_parts(email, password)?;
        self.gateway.register(&credentials).await?;
        info!(email = credentials.email(), "account registered");
        self.login(email, password).await
    }

    /// Destroy the session and the persisted token. Idempotent.
    pub fn logout(&mut self) {
        self.session = None;
        self.loading = false;
        self.discard_token();
    }

    /// Global reset after an authenticated call reported the token as
    /// rejected.
    pub fn force_logout(&mut self, reason: &str) {
        if self.session.is_some() {
            warn!(reason, "session revoked");
        }
        self.logout();
    }

    fn establish(&mut self, profile: UserProfile, token: AccessToken) -> Result<(), SessionError> {
        if !profile.is_active {
            return Err(SessionError::Inactive);
        }
        self.tokens.save(&token)?;
        info!(user_id = %profile.id, "signed in");
        self.session = Some(Session::new(profile, token));
        self.loading = false;
        Ok(())
    }

    fn discard_token(&self) {
        if let Err(error) = self.tokens.clear() {
            warn!(%error, "failed to clear persisted token");
        }
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
