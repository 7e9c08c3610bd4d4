//! HTTP client for the escrow service.
//!
//! Thin JSON wrapper over the four service endpoints. Status codes that carry
//! protocol meaning (unknown identity, missing escrow record) are mapped to
//! dedicated [`ClientError`] variants so callers can react to them.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use escrow_crypto::SessionKey;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the key escrow service.
#[derive(Clone, Debug)]
pub struct EscrowApiClient {
    client: Client,
    base_url: String,
}

impl EscrowApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> ClientResult<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let body: HealthResponse = resp.json().await?;
        Ok(body.ok)
    }

    /// Asks the service to issue a fresh identity.
    pub async fn create_identity(&self) -> ClientResult<IdentityInfo> {
        let resp = self.client.post(self.url("/identities")).send().await?;
        if resp.status() != StatusCode::CREATED {
            return Err(api_error(resp).await);
        }
        let identity: IdentityInfo = resp.json().await?;
        debug!("issued identity {}", identity.identity_id);
        Ok(identity)
    }

    /// Escrows a wrapped session key under `identity_id`.
    ///
    /// Returns only once the service has confirmed the record is stored.
    pub async fn store_wrapped_key(
        &self,
        identity_id: &str,
        wrapped_key: &[u8],
        files_count: u32,
    ) -> ClientResult<()> {
        let encoded = STANDARD.encode(wrapped_key);
        let resp = self
            .client
            .post(self.url(&format!("/identities/{identity_id}/keys")))
            .json(&StoreKeyRequest {
                wrapped_key: &encoded,
                files_count,
            })
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                return Err(ClientError::IdentityNotFound(identity_id.to_string()));
            }
            status if !status.is_success() => return Err(api_error(resp).await),
            _ => {}
        }

        let body: StoreKeyResponse = resp.json().await?;
        if !body.stored {
            return Err(ClientError::Api {
                status: StatusCode::CREATED.as_u16(),
                message: "server did not confirm storage".into(),
            });
        }
        debug!("escrowed wrapped key for {identity_id} ({files_count} files)");
        Ok(())
    }

    /// Fetches the latest escrowed session key for `identity_id`.
    pub async fn recover(&self, identity_id: &str) -> ClientResult<SessionKey> {
        let resp = self
            .client
            .post(self.url("/recover"))
            .json(&RecoverRequest { identity_id })
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                return Err(ClientError::NoEscrowRecord(identity_id.to_string()));
            }
            status if !status.is_success() => return Err(api_error(resp).await),
            _ => {}
        }

        let body: RecoverResponse = resp.json().await?;
        match body.key {
            Some(key) if body.success => Ok(SessionKey::from_base64(&key)?),
            _ => Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message: "recovery response carried no key".into(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Builds a [`ClientError::Api`] from a non-success response, preferring the
/// service's `{"error": ...}` message over the raw body.
async fn api_error(resp: Response) -> ClientError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    ClientError::Api { status, message }
}
