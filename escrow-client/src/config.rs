//! Escrow client configuration.

use escrow_crypto::{ContainerFormat, WrapScheme};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the escrow client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the escrow service (e.g., "http://127.0.0.1:4000").
    pub api_base_url: String,

    /// Where the issued identity is cached between runs.
    pub identity_cache_path: PathBuf,

    /// Padding used to wrap session keys. Must match the server.
    pub wrap_scheme: WrapScheme,

    /// Layout written for newly encrypted files.
    pub container_format: ContainerFormat,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:4000".to_string(),
            identity_cache_path: PathBuf::from("escrow-identity.json"),
            wrap_scheme: WrapScheme::Oaep,
            container_format: ContainerFormat::Versioned,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `api_base_url` with the identity cached at `identity_cache_path`.
    pub fn new(api_base_url: impl Into<String>, identity_cache_path: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            identity_cache_path: identity_cache_path.into(),
            ..Self::default()
        }
    }
}
