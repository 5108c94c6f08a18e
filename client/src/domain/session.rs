//! Authentication primitives: credentials, access tokens and the session.
//!
//! Inputs are validated by constructors before any port is called so the
//! session store never sends a request that the server would reject for
//! shape alone.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email lacks the `@` separator.
    #[error("email must contain '@'")]
    MalformedEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the session store.
///
/// ## Invariants
/// - `email` is trimmed, non-empty and contains `@`.
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use wiki_client::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" ada@example.org ", "hunter2").unwrap();
/// assert_eq!(creds.email(), "ada@example.org");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }
        if !normalized.contains('@') {
            return Err(CredentialsValidationError::MalformedEmail);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the login name.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token issued by the server.
///
/// The value is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Borrow the token for an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Numeric user identifier assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile returned by the current-user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Disabled accounts cannot hold a session.
    pub is_active: bool,
    /// Superusers bypass every room-scoped role check.
    pub is_superuser: bool,
}

/// Authenticated session.
///
/// Owned by the session store; every other component reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    email: String,
    is_superuser: bool,
    token: AccessToken,
}

impl Session {
    /// Combine a validated token with the profile fetched for it.
    pub fn new(profile: UserProfile, token: AccessToken) -> Self {
        Self {
            user_id: profile.id,
            email: profile.email,
            is_superuser: profile.is_superuser,
            token,
        }
    }

    /// Identifier of the signed-in user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Email of the signed-in user.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Whether the user is a superuser.
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Bearer token for authenticated requests.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}
