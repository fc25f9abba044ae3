//! # cloudflare-core
//!
//! Core types and utilities for talking to the Cloudflare v4 REST API.
//!
//! This crate provides the shared error type, client configuration, the HTTP
//! transport abstraction and response envelope decoding used by the endpoint
//! crates in this workspace.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`config`] - API configuration and credentials
//! - [`client`] - HTTP client tuning and default constants
//! - [`transport`] - The [`Transport`] trait and its `reqwest` implementation
//! - [`envelope`] - Unwrapping of `{ "result", "success" }` response envelopes

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use config::{ApiConfig, Credentials};
pub use error::{Error, Result};
pub use transport::{api_path, HttpTransport, HttpTransportBuilder, Response, Transport};
