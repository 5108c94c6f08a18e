//! Domain-level error types.
//!
//! These errors are transport agnostic. Services map port failures into them
//! and the calling surface decides how to present them: an authentication
//! failure forces a logout, a network failure becomes a transient notice, and
//! a missing page simply means "no selection".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The token is missing, invalid or expired.
    Unauthorized,
    /// Authenticated but the room denies this caller.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The server could not be reached or answered unexpectedly.
    Network,
    /// An unexpected error occurred inside the client.
    Internal,
}

impl ErrorCode {
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::Unauthorized => "authentication required",
            Self::Forbidden => "access denied",
            Self::NotFound => "not found",
            Self::Network => "network error",
            Self::Internal => "internal error",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use wiki_client::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("page ghost");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(!err.is_auth_failure());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by [`Error::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was empty after trimming.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Create a new error. Blank messages are replaced with a generic
    /// description of `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(ErrorValidationError::EmptyMessage) => Self {
                code,
                message: code.fallback_message().to_owned(),
                details: None,
            },
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether the failure must end the session.
    pub fn is_auth_failure(&self) -> bool {
        self.code == ErrorCode::Unauthorized
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn try_new_rejects_empty_messages() {
        let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
        assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
    }

    #[rstest]
    #[case(ErrorCode::NotFound, "not found")]
    #[case(ErrorCode::Network, "network error")]
    fn new_substitutes_blank_messages(#[case] code: ErrorCode, #[case] expected: &str) {
        let err = Error::new(code, "");
        assert_eq!(err.message(), expected);
        assert_eq!(err.code(), code);
    }

    #[rstest]
    #[case(Error::unauthorized("expired"), true)]
    #[case(Error::forbidden("no access"), false)]
    #[case(Error::network("offline"), false)]
    fn only_unauthorized_is_an_auth_failure(#[case] err: Error, #[case] expected: bool) {
        assert_eq!(err.is_auth_failure(), expected);
    }

    #[rstest]
    fn serialises_code_in_snake_case_and_skips_missing_details() {
        let value = serde_json::to_value(Error::invalid_request("bad")).expect("serialise");
        assert_eq!(value, json!({ "code": "invalid_request", "message": "bad" }));

        let detailed = Error::not_found("gone").with_details(json!({ "slug": "ghost" }));
        assert_eq!(detailed.details(), Some(&json!({ "slug": "ghost" })));
    }
}
