// HTTP request handlers
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::readings_service::QueryError;
use crate::presentation::app_state::AppState;

#[derive(Deserialize)]
pub struct ReadingsQuery {
    /// Comma-separated column names.
    pub columns: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ReadingsResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Time-range query over stored readings, shaped for charting clients
pub async fn readings(
    Query(query): Query<ReadingsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let columns: Vec<String> = query
        .columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect();

    match state
        .readings_service
        .query_readings(columns, query.from, query.to)
        .await
    {
        Ok(series) => {
            let mut columns = vec!["time".to_string()];
            columns.extend(series.columns);
            let rows = series
                .rows
                .into_iter()
                .map(|row| {
                    let mut out = Vec::with_capacity(row.values.len() + 1);
                    out.push(serde_json::json!(row.time_ms));
                    out.extend(row.values.into_iter().map(|value| serde_json::json!(value)));
                    out
                })
                .collect();
            Json(ReadingsResponse { columns, rows }).into_response()
        }
        Err(QueryError::Store(e)) => {
            tracing::error!("readings query failed: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

/// The most recently parsed telegram
pub async fn latest_telegram(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.last_telegram.read().await.clone() {
        Some(telegram) => Json(telegram).into_response(),
        None => (StatusCode::NOT_FOUND, "no telegram parsed yet").into_response(),
    }
}
