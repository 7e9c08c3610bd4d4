//! Identity issuance and wrapped-key escrow.
//!
//! An identity is an RSA keypair held by the server. Clients receive only the
//! public half, wrap their session key under it, and post the result back to
//! `/identities/{id}/keys` before touching any file.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{client_ip::ClientIp, error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/identities", post(create_identity))
        .route("/identities/{id}/keys", post(store_wrapped_key))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentityResponse {
    pub identity_id: String,
    /// SPKI PEM.
    pub public_key: String,
}

/// Both fields are optional here so that a missing field is a 400 with a
/// readable message rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreKeyRequest {
    pub wrapped_key: Option<String>,
    pub files_count: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreKeyResponse {
    pub stored: bool,
}

async fn create_identity(
    State(state): State<AppState>,
    ClientIp(origin_ip): ClientIp,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.authority.create_identity(&origin_ip).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateIdentityResponse {
            identity_id: issued.identity_id,
            public_key: issued.public_key_pem,
        }),
    ))
}

async fn store_wrapped_key(
    State(state): State<AppState>,
    Path(identity_id): Path<String>,
    ClientIp(origin_ip): ClientIp,
    payload: Result<Json<StoreKeyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let encoded = payload
        .wrapped_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AppError::Validation("wrappedKey is required".into()))?;
    let files_count = payload
        .files_count
        .ok_or_else(|| AppError::Validation("filesCount is required".into()))?;
    let wrapped_key = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::Validation("wrappedKey must be base64".into()))?;

    tracing::debug!(%identity_id, files_count, "escrow request");
    state
        .escrow
        .store_wrapped_key(&identity_id, wrapped_key, files_count, &origin_ip)
        .await?;

    Ok((StatusCode::CREATED, Json(StoreKeyResponse { stored: true })))
}
