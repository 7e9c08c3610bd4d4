//! Key recovery.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/recover", post(recover_key))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverRequest {
    pub identity_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecoverResponse {
    pub success: bool,
    /// Base64 of the raw 32-byte session key.
    pub key: String,
}

async fn recover_key(
    State(state): State<AppState>,
    payload: Result<Json<RecoverRequest>, JsonRejection>,
) -> Result<Json<RecoverResponse>, AppError> {
    let Json(payload) = payload?;
    let identity_id = payload
        .identity_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("identityId is required".into()))?;

    let key = state.recovery.recover(&identity_id).await?;

    Ok(Json(RecoverResponse {
        success: true,
        key: key.to_base64(),
    }))
}
