//! Client configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::Error;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TOKEN_FILE: &str = ".wiki-client/token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the API connection and local token persistence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WIKI_CLIENT")]
pub struct ClientSettings {
    /// Server origin; REST paths live under `/api/v1`.
    pub api_base_url: Option<String>,
    /// File holding the bearer token between runs.
    pub token_file: Option<PathBuf>,
    /// Per-request timeout in seconds; zero means the default.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

impl ClientSettings {
    /// Parsed API origin, falling back to the local development server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] when the configured value is not an
    /// absolute URL.
    pub fn api_base_url(&self) -> Result<Url, Error> {
        let raw = self
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw)
            .map_err(|error| Error::invalid_request(format!("invalid api_base_url {raw}: {error}")))
    }

    /// Token file location, falling back to `.wiki-client/token`.
    pub fn token_file(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE))
    }

    /// Request timeout; zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        let secs = match self.request_timeout_secs {
            0 => DEFAULT_TIMEOUT_SECS,
            secs => secs,
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("wiki-nav")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("WIKI_CLIENT_API_BASE_URL", None::<String>),
            ("WIKI_CLIENT_TOKEN_FILE", None::<String>),
            ("WIKI_CLIENT_REQUEST_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("default url").as_str(),
            "http://localhost:8000/"
        );
        assert_eq!(settings.token_file(), PathBuf::from(DEFAULT_TOKEN_FILE));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "WIKI_CLIENT_API_BASE_URL",
                Some("https://wiki.example.org/base".to_owned()),
            ),
            ("WIKI_CLIENT_TOKEN_FILE", Some("/tmp/wiki-token".to_owned())),
            ("WIKI_CLIENT_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("url").as_str(),
            "https://wiki.example.org/base"
        );
        assert_eq!(settings.token_file(), PathBuf::from("/tmp/wiki-token"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    fn timeout_alone_can_be_overridden() {
        let _guard = lock_env([
            ("WIKI_CLIENT_API_BASE_URL", None::<String>),
            ("WIKI_CLIENT_TOKEN_FILE", None::<String>),
            ("WIKI_CLIENT_REQUEST_TIMEOUT_SECS", Some("0".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.request_timeout_secs, 0);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.token_file(), PathBuf::from(DEFAULT_TOKEN_FILE));
    }

    #[rstest]
    fn malformed_base_url_is_rejected() {
        let settings = ClientSettings {
            api_base_url: Some("not a url".to_owned()),
            token_file: None,
            request_timeout_secs: 0,
        };
        assert!(settings.api_base_url().is_err());
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }
}
