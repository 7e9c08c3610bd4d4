//! Domain errors and their HTTP mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use escrow_crypto::CryptoError;
use escrow_storage::StorageError;
use serde_json::json;
use thiserror::Error;

/// Result type for escrow service operations.
pub type EscrowResult<T> = Result<T, EscrowError>;

#[derive(Debug, Error)]
pub enum EscrowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("no escrow record for identity {0}")]
    NoEscrowRecord(String),

    /// An escrow record exists but the identity's private key is missing or unreadable.
    #[error("identity data corrupted for {identity_id}: {reason}")]
    IdentityDataCorruption { identity_id: String, reason: String },

    #[error("failed to unwrap escrowed key: {0}")]
    Decryption(#[source] CryptoError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub enum AppError {
    /// Internal errors - logged but return generic 500 to user
    Internal(anyhow::Error),
    /// User-facing errors - message is safe to show
    External(StatusCode, &'static str),
    /// Validation errors - safe to show
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::External(status, msg) => (status, msg.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<EscrowError> for AppError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::Validation(msg) => AppError::Validation(msg),
            EscrowError::IdentityNotFound(_) => {
                AppError::External(StatusCode::UNAUTHORIZED, "Unknown identityId")
            }
            EscrowError::NoEscrowRecord(_) => {
                AppError::External(StatusCode::NOT_FOUND, "No escrow record for identity")
            }
            EscrowError::IdentityDataCorruption { .. } | EscrowError::Decryption(_) => {
                tracing::error!("key recovery failed: {err}");
                AppError::External(StatusCode::INTERNAL_SERVER_ERROR, "Key recovery failed")
            }
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::External(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_returns_500_generic_message() {
        let err = AppError::Internal(anyhow::anyhow!("database is locked"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn internal_error_hides_sensitive_details() {
        let err = AppError::Internal(anyhow::anyhow!("private_key=MIIEvQ leaked"));
        let body = response_json(err.into_response()).await.to_string();

        assert!(!body.contains("MIIEvQ"));
        assert!(!body.contains("private_key"));
    }

    #[tokio::test]
    async fn validation_error_returns_400_with_details() {
        let err = AppError::Validation("wrappedKey is required".into());
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"], "wrappedKey is required");
    }

    #[tokio::test]
    async fn unknown_identity_maps_to_401() {
        let err: AppError = EscrowError::IdentityNotFound("abc".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_record_maps_to_404() {
        let err: AppError = EscrowError::NoEscrowRecord("abc".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unwrap_failure_maps_to_500_without_details() {
        let err: AppError =
            EscrowError::Decryption(CryptoError::Unwrap("padding check failed".into())).into();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["error"], "Key recovery failed");
    }

    #[tokio::test]
    async fn storage_error_converts_to_internal() {
        let err: AppError = EscrowError::Storage(StorageError::LockPoisoned).into();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response_json(response).await["error"], "Internal server error");
    }
}
