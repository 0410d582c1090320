//! HTTP route handlers.
//!
//! This module defines the HTTP API surface of the gateway, validating query
//! parameters, delegating to the [`Store`](crate::store::Store) and encoding
//! the results.
//!
//! Query strings are read as raw key/value pairs. A repeated key resolves to
//! its first value, so no query string is rejected before it reaches a
//! handler.

use crate::{
    columns::Column,
    error::GatewayError,
    export::ExportFormat,
    gateway::state::AppState,
    store::query::{SearchParams, SearchQuery},
};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use serde::Serialize;
use tracing::warn;

/// Decoded query-string pairs, in request order.
pub type QueryPairs = Vec<(String, String)>;

/// Creates the router with all gateway endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/unique_values", get(handle_unique_values))
        .route("/search", get(handle_search))
        .route("/download", get(handle_download))
        .route("/suggestions", get(handle_suggestions))
        .route("/health", get(handle_health))
}

/// First value of `key`, if present.
pub fn first_param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Resolves a requested column name against the whitelist.
fn parse_column(column: Option<&str>) -> Result<Column, GatewayError> {
    let raw = column.unwrap_or_default();
    raw.parse().map_err(|_| {
        warn!(column = %raw, "rejected column name");
        GatewayError::InvalidColumn
    })
}

/// Handles `GET /unique_values?column=..`.
pub async fn handle_unique_values(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, GatewayError> {
    let column = parse_column(first_param(&pairs, "column"))?;
    let values = state.store.unique_values(column).await?;
    state.format.ok(&values)
}

/// Handles `GET /search` with up to five optional substring filters.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, GatewayError> {
    let query = SearchQuery::from_params(&SearchParams::from_pairs(&pairs));
    let rows = state.store.search(&query).await?;
    state.format.ok(&rows)
}

/// Handles `GET /download?format=csv|json&..`, returning the `/search`
/// rows for the same filters as a file attachment.
pub async fn handle_download(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, GatewayError> {
    let format: ExportFormat = first_param(&pairs, "format")
        .unwrap_or_default()
        .parse()
        .map_err(|_| GatewayError::InvalidExportFormat)?;
    let query = SearchQuery::from_params(&SearchParams::from_pairs(&pairs));
    let rows = state.store.search(&query).await?;
    format.attachment(&rows)
}

/// Handles `GET /suggestions?column=..&query=..`.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, GatewayError> {
    let column = parse_column(first_param(&pairs, "column"))?;
    let prefix = first_param(&pairs, "query").unwrap_or_default().trim();
    let suggestions = state.store.suggestions(column, prefix).await?;
    state.format.ok(&suggestions)
}

/// Handles `GET /health` requests by pinging the database.
pub async fn handle_health(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, GatewayError> {
    state.store.ping().await.map_err(|err| {
        warn!(error = %err, "health check failed");
        GatewayError::BackendUnavailable
    })?;

    Ok(Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
