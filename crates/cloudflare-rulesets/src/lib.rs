//! Zone rulesets client for the Cloudflare v4 API.
//!
//! Provides ruleset models and an asynchronous client covering list, get,
//! create, update and delete of zone rulesets, plus removal of rules by name.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{RulesetClient, RulesetClientBuilder};
pub use cloudflare_core::{ApiConfig, Credentials, Error};
pub use models::{Rule, Ruleset, RulesetKind, RulesetRequest};

/// Convenient result alias that reuses the shared API error type.
pub type Result<T> = cloudflare_core::Result<T>;
