//! Configuration structures for API clients.
//!
//! This module provides the endpoint, timeout and TLS settings used to reach the
//! API, and the credentials attached to every request.

use crate::client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// How requests authenticate with the API.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Scoped API token, sent as `Authorization: Bearer <token>`.
    ApiToken(SecretString),
    /// Legacy global API key, sent as `X-Auth-Email` / `X-Auth-Key`.
    ApiKey {
        /// Account email address
        email: String,
        /// Global API key
        key: SecretString,
    },
}

impl Credentials {
    /// Build token credentials.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::ApiToken(SecretString::from(token.into()))
    }

    /// Build email + global key credentials.
    #[must_use]
    pub fn api_key(email: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ApiKey {
            email: email.into(),
            key: SecretString::from(key.into()),
        }
    }
}

/// Configuration for an API client instance.
///
/// Credentials are never serialized; supply them with [`ApiConfig::with_credentials`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// API base URL; request paths are resolved beneath it
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Optional User-Agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Request credentials
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT
}

const fn default_tls_verify() -> bool {
    true
}

impl ApiConfig {
    /// Create a new configuration pointing at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the request credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Authenticate with a scoped API token.
    #[must_use]
    pub fn with_api_token(self, token: impl Into<String>) -> Self {
        self.with_credentials(Credentials::token(token))
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set connect timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = seconds;
        self
    }

    /// Override the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Derive the HTTP client settings from this configuration.
    #[must_use]
    pub fn http_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.timeout())
            .with_connect_timeout(self.connect_timeout())
    }

    /// Parse the base URL, ensuring it ends with `/`.
    ///
    /// Without the trailing slash `Url::join` would replace the last path
    /// segment (`v4`) instead of appending to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid base URL: {e}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            user_agent: None,
            credentials: None,
        }
    }
}
