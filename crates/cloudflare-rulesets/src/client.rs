//! Asynchronous zone rulesets client.

use crate::models::Ruleset;
use crate::Result;
use cloudflare_core::client::ClientConfig;
use cloudflare_core::envelope::{result_or_default, success_flag};
use cloudflare_core::{
    api_path, ApiConfig, Credentials, HttpTransport, HttpTransportBuilder, Transport,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("cloudflare-rulesets/", env!("CARGO_PKG_VERSION"));

/// Builder for [`RulesetClient`] backed by an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct RulesetClientBuilder {
    inner: HttpTransportBuilder,
}

impl RulesetClientBuilder {
    /// Create a builder from an [`ApiConfig`].
    #[must_use]
    pub fn new(mut config: ApiConfig) -> Self {
        if config.user_agent.is_none() {
            config.user_agent = Some(USER_AGENT.to_string());
        }
        Self {
            inner: HttpTransport::builder(config),
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Set the request credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.inner = self.inner.with_credentials(credentials);
        self
    }

    /// Authenticate with a scoped API token.
    #[must_use]
    pub fn with_api_token(self, token: impl Into<String>) -> Self {
        self.with_credentials(Credentials::token(token))
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`](crate::Error::ConfigError) for an invalid
    /// base URL or CA certificate, or when the HTTP client cannot be built.
    pub fn build(self) -> Result<RulesetClient> {
        let transport = self.inner.build()?;
        Ok(RulesetClient::new(Arc::new(transport)))
    }
}

/// Client for the zone rulesets endpoints.
///
/// Every method is one independent request/response cycle against the
/// transport; nothing is cached between calls.
#[derive(Clone)]
pub struct RulesetClient {
    transport: Arc<dyn Transport>,
}

impl RulesetClient {
    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Construct an HTTP-backed client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`RulesetClientBuilder::build`].
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        RulesetClientBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: ApiConfig) -> RulesetClientBuilder {
        RulesetClientBuilder::new(config)
    }

    /// List all rulesets of a zone.
    ///
    /// Only the first response is read; pagination is not followed.
    pub async fn list_zone_rulesets(&self, zone_id: &str) -> Result<Vec<Ruleset>> {
        debug!(zone_id, "listing zone rulesets");
        let response = self.transport.get(&rulesets_path(zone_id)?).await?;
        result_or_default(response)
    }

    /// List the rulesets of a zone whose phase equals `phase` exactly.
    pub async fn get_rulesets_by_phase(&self, zone_id: &str, phase: &str) -> Result<Vec<Ruleset>> {
        let rulesets = self.list_zone_rulesets(zone_id).await?;
        Ok(rulesets
            .into_iter()
            .filter(|ruleset| ruleset.phase() == Some(phase))
            .collect())
    }

    /// Fetch a ruleset.
    ///
    /// A response without `result` yields an empty [`Ruleset`], which is
    /// indistinguishable from a ruleset with no fields.
    pub async fn get_ruleset(&self, zone_id: &str, ruleset_id: &str) -> Result<Ruleset> {
        debug!(zone_id, ruleset_id, "fetching ruleset");
        let response = self
            .transport
            .get(&ruleset_path(zone_id, ruleset_id)?)
            .await?;
        result_or_default(response)
    }

    /// Create a ruleset in a zone. The payload is sent as-is.
    pub async fn create_ruleset<P>(&self, zone_id: &str, payload: &P) -> Result<Ruleset>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_value(payload)?;
        debug!(zone_id, "creating ruleset");
        let response = self.transport.post(&rulesets_path(zone_id)?, &body).await?;
        result_or_default(response)
    }

    /// Replace a ruleset. The payload is sent as-is.
    pub async fn update_ruleset<P>(
        &self,
        zone_id: &str,
        ruleset_id: &str,
        payload: &P,
    ) -> Result<Ruleset>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_value(payload)?;
        debug!(zone_id, ruleset_id, "updating ruleset");
        let response = self
            .transport
            .put(&ruleset_path(zone_id, ruleset_id)?, &body)
            .await?;
        result_or_default(response)
    }

    /// Remove every rule whose description equals `rule_name`.
    ///
    /// Returns `false` without writing when no rule matches. Otherwise the
    /// remaining rules are written back with a payload holding only `rules`,
    /// and the result reports whether the API returned the updated ruleset.
    ///
    /// This is a read-modify-write: rules added remotely between the read and
    /// the write are overwritten.
    pub async fn delete_rule_by_name(
        &self,
        zone_id: &str,
        ruleset_id: &str,
        rule_name: &str,
    ) -> Result<bool> {
        let ruleset = self.get_ruleset(zone_id, ruleset_id).await?;
        let rules = ruleset.rule_values();

        let retained: Vec<&Value> = rules
            .iter()
            .filter(|rule| rule_name_of(rule) != Some(rule_name))
            .collect();

        if retained.len() == rules.len() {
            debug!(zone_id, ruleset_id, rule_name, "no rule matched; nothing to delete");
            return Ok(false);
        }

        let removed = rules.len() - retained.len();
        let payload = json!({ "rules": retained });
        let updated = self.update_ruleset(zone_id, ruleset_id, &payload).await?;

        info!(zone_id, ruleset_id, rule_name, removed, "deleted rules by name");
        Ok(!updated.is_empty())
    }

    /// Delete a ruleset. Returns the envelope's `success` flag.
    pub async fn delete_ruleset(&self, zone_id: &str, ruleset_id: &str) -> Result<bool> {
        let response = self
            .transport
            .delete(&ruleset_path(zone_id, ruleset_id)?)
            .await?;
        let success = success_flag(response)?;
        if success {
            info!(zone_id, ruleset_id, "deleted ruleset");
        } else {
            debug!(zone_id, ruleset_id, "ruleset delete not acknowledged");
        }
        Ok(success)
    }
}

fn rulesets_path(zone_id: &str) -> Result<String> {
    api_path(["zones", zone_id, "rulesets"])
}

fn ruleset_path(zone_id: &str, ruleset_id: &str) -> Result<String> {
    api_path(["zones", zone_id, "rulesets", ruleset_id])
}

fn rule_name_of(rule: &Value) -> Option<&str> {
    rule.get("description").and_then(Value::as_str)
}
