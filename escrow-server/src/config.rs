use std::path::PathBuf;

use escrow_crypto::WrapScheme;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `KEY_ESCROW_PORT=4000`.
pub const ENV_PREFIX: &str = "KEY_ESCROW_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// SQLite database file. Parent directories are created on open.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Padding used when unwrapping escrowed keys. Must match what clients wrap with.
    #[serde(default)]
    pub wrap_scheme: WrapScheme,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/escrow.sqlite")
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            env: String::new(),
            wrap_scheme: WrapScheme::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from `KEY_ESCROW_*` environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env::<Self>()
    }

    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_environment() {
        let config: ServerConfig = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4000);
        assert_eq!(config.database_path, PathBuf::from("data/escrow.sqlite"));
        assert_eq!(config.wrap_scheme, WrapScheme::Oaep);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert!(!config.is_production());
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let vars = vec![
            ("KEY_ESCROW_PORT".to_string(), "8088".to_string()),
            ("KEY_ESCROW_ENV".to_string(), "production".to_string()),
            ("KEY_ESCROW_WRAP_SCHEME".to_string(), "pkcs1v15".to_string()),
            ("UNRELATED".to_string(), "ignored".to_string()),
        ];
        let config: ServerConfig = envy::prefixed(ENV_PREFIX).from_iter(vars).unwrap();
        assert_eq!(config.port, 8088);
        assert!(config.is_production());
        assert_eq!(config.wrap_scheme, WrapScheme::Pkcs1v15);
        assert_eq!(config.bind_addr(), "127.0.0.1:8088");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let vars = vec![("KEY_ESCROW_PORT".to_string(), "not-a-port".to_string())];
        let result = envy::prefixed(ENV_PREFIX).from_iter::<_, ServerConfig>(vars);
        assert!(result.is_err());
    }
}
