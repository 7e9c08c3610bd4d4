//! Escrow log listing for operators. Never returns key material.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::{DateTime, Utc};
use escrow_storage::EscrowRecord;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

/// Records returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 5;

pub fn router() -> Router<AppState> {
    Router::new().route("/escrow/records", get(list_records))
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub identity_id: String,
    pub files_count: u32,
    pub received_at: DateTime<Utc>,
    pub origin_ip: String,
}

impl From<&EscrowRecord> for RecordSummary {
    fn from(record: &EscrowRecord) -> Self {
        Self {
            identity_id: record.identity_id.clone(),
            files_count: record.files_count,
            received_at: record.received_at,
            origin_ip: record.origin_ip.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<RecordSummary>,
}

async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<RecordsQuery>, QueryRejection>,
) -> Result<Json<RecordsResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let records = state
        .escrow
        .recent(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;

    Ok(Json(RecordsResponse {
        records: records.iter().map(RecordSummary::from).collect(),
    }))
}
