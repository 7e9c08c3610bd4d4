//! Wire types shared with the escrow service.

use serde::{Deserialize, Serialize};

/// An identity issued by the escrow service. Also the on-disk cache format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfo {
    pub identity_id: String,
    /// SPKI PEM.
    pub public_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreKeyRequest<'a> {
    pub wrapped_key: &'a str,
    pub files_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoreKeyResponse {
    pub stored: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecoverRequest<'a> {
    pub identity_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecoverResponse {
    pub success: bool,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
