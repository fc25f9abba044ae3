//! HTTP transport abstraction.
//!
//! Endpoint clients talk to the API exclusively through the narrow [`Transport`]
//! trait so that the `reqwest`-backed [`HttpTransport`] can be swapped for a
//! test double.

use crate::client::ClientConfig;
use crate::config::{ApiConfig, Credentials};
use crate::{Error, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("cloudflare-core/", env!("CARGO_PKG_VERSION"));

/// Everything except RFC 3986 unreserved characters is escaped inside a segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build a relative API path from raw segments, percent-encoding each one.
///
/// Caller-supplied identifiers stay a single segment: `/`, `?` and `#` are
/// escaped so they cannot reach another endpoint or add a query string.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] for a segment that is exactly `.` or
/// `..`; URL resolution would drop such a segment in any encoding.
pub fn api_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut encoded = Vec::new();
    for segment in segments {
        if matches!(segment, "." | "..") {
            return Err(Error::InvalidEndpoint(format!(
                "path segment `{segment}` cannot be sent"
            )));
        }
        encoded.push(utf8_percent_encode(segment, PATH_SEGMENT).to_string());
    }
    Ok(encoded.join("/"))
}

/// A successful HTTP response with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: Vec<u8>,
}

impl Response {
    /// Create a response from a status and raw body.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the response and decode its body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }
}

/// The four HTTP verbs the endpoint clients need.
///
/// Paths are relative to the API base (`zones/{id}/rulesets`). Implementations
/// return `Ok` only for successful responses; transport failures and non-2xx
/// statuses surface as [`Error`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a `GET`.
    async fn get(&self, path: &str) -> Result<Response>;

    /// Issue a `POST` with a JSON body.
    async fn post(&self, path: &str, body: &Value) -> Result<Response>;

    /// Issue a `PUT` with a JSON body.
    async fn put(&self, path: &str, body: &Value) -> Result<Response>;

    /// Issue a `DELETE`.
    async fn delete(&self, path: &str) -> Result<Response>;
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    config: ApiConfig,
    http_config: ClientConfig,
}

impl HttpTransportBuilder {
    /// Create a new builder from an [`ApiConfig`].
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let http_config = config.http_config();
        Self {
            config,
            http_config,
        }
    }

    /// Override the HTTP client configuration used when building the transport.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Set the request credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Finalise the builder and create the [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for an invalid base URL or CA certificate,
    /// or when the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<HttpTransport> {
        let base_url = self.config.parse_base_url()?;
        let http_config = self.http_config;

        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());

        let mut builder = ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(http_config.timeout)
            .connect_timeout(http_config.connect_timeout)
            .pool_idle_timeout(http_config.pool_idle_timeout)
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .gzip(http_config.enable_compression);

        if !self.config.tls_verify {
            warn!("TLS verification disabled for API transport");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.config.tls_ca_cert {
            debug!("loading CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpTransport {
            http,
            base_url,
            credentials: self.config.credentials,
        })
    }
}

/// `reqwest`-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Construct a transport directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpTransportBuilder::build`].
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        HttpTransportBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: ApiConfig) -> HttpTransportBuilder {
        HttpTransportBuilder::new(config)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(Credentials::ApiToken(token)) => request.bearer_auth(token.expose_secret()),
            Some(Credentials::ApiKey { email, key }) => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.build_url(path)?;
        debug!(%method, path = %path, "Sending API request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header("Accept", "application/json");
        if let Some(payload) = body {
            request = request.json(payload);
        }
        request = self.authorize(request);

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(Response::new(status, bytes.to_vec()));
        }

        let text = String::from_utf8_lossy(&bytes);
        warn!(%method, path = %path, %status, "API request failed");
        Err(Error::from_status(status, &text))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Response> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Response> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        self.send(Method::DELETE, path, None).await
    }
}
