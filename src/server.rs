//! HTTP surface of the reconciliation service.
//!
//! `/` accepts GET or POST:
//! - `queries`: JSON object of keyed queries, answered as `{key: {"result": [...]}}`
//! - `query`: one query (text or JSON object), answered as `{"result": [...]}`
//! - neither: the service metadata
//!
//! A `callback` parameter wraps the JSON body as JSONP.

use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::core::{parse_batch, QueryResult, ReconcileQuery};
use crate::engine::ReconcileEngine;
use crate::error::ReconcileError;

/// Mimetype of JSONP responses
pub const JSONP_CONTENT_TYPE: &str = "text/javascript";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReconcileEngine>,
}

impl AppState {
    pub fn new(engine: ReconcileEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Parameters read from the query string and the form body
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    pub queries: Option<String>,
    pub query: Option<String>,
    pub callback: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    upstream: BTreeMap<String, bool>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    cache: CacheStatsDto,
}

#[derive(Debug, Serialize)]
struct CacheStatsDto {
    total_entries: u64,
    total_hits: u64,
    avg_hit_count: f64,
}

/// Build the service router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(reconcile_get).post(reconcile_post))
        .route("/health", get(health_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn reconcile_get(
    State(state): State<AppState>,
    Query(params): Query<ReconcileParams>,
) -> Result<Response, AppError> {
    reconcile(&state, params, ReconcileParams::default()).await
}

async fn reconcile_post(
    State(state): State<AppState>,
    Query(params): Query<ReconcileParams>,
    form: Option<Form<ReconcileParams>>,
) -> Result<Response, AppError> {
    // a bare POST with no form body is answered like a GET
    let form = form.map(|Form(form)| form).unwrap_or_default();
    reconcile(&state, params, form).await
}

async fn reconcile(
    state: &AppState,
    url: ReconcileParams,
    form: ReconcileParams,
) -> Result<Response, AppError> {
    let callback = url.callback.or(form.callback).filter(|c| !c.is_empty());
    if let Some(callback) = &callback {
        if !is_valid_callback(callback) {
            return Err(ReconcileError::InvalidQuery(format!("invalid callback '{}'", callback)).into());
        }
    }

    let queries = form.queries.or(url.queries).filter(|q| !q.is_empty());
    let single = form.query.or(url.query).filter(|q| !q.is_empty());

    let body = if let Some(raw) = queries {
        let batch = parse_batch(&raw)?;
        tracing::debug!("Batch of {} queries", batch.len());
        serde_json::to_string(&state.engine.search_batch(batch).await)?
    } else if let Some(raw) = single {
        let query = ReconcileQuery::from_param(&raw)?;
        serde_json::to_string(&QueryResult::new(state.engine.search(&query).await))?
    } else {
        serde_json::to_string(&state.engine.metadata())?
    };

    Ok(respond(body, callback.as_deref()))
}

/// Plain JSON, or `callback(json)` as JavaScript
fn respond(json: String, callback: Option<&str>) -> Response {
    match callback {
        Some(callback) => (
            [(header::CONTENT_TYPE, JSONP_CONTENT_TYPE)],
            format!("{}({})", callback, json),
        )
            .into_response(),
        None => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
    }
}

/// JSONP callbacks must be a plain JavaScript identifier path (`a.b_c$1`)
pub fn is_valid_callback(callback: &str) -> bool {
    !callback.is_empty()
        && callback.len() <= 128
        && !callback.starts_with(|c: char| c.is_ascii_digit())
        && callback
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// Liveness plus upstream reachability; always 200 so the process stays routable
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let upstream = state.engine.provider_health().await;
    let status = if upstream.values().all(|available| *available) {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: crate::VERSION.to_string(),
        upstream,
    })
}

async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let cache_stats = state.engine.cache_stats().await?;

    Ok(Json(StatsResponse {
        cache: CacheStatsDto {
            total_entries: cache_stats.total_entries,
            total_hits: cache_stats.total_hits,
            avg_hit_count: cache_stats.avg_hit_count,
        },
    }))
}

// Error handling
pub struct AppError(ReconcileError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ReconcileError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ReconcileError::Cache(_) | ReconcileError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReconcileError::Provider { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.0.to_string();

        if status.is_client_error() {
            tracing::warn!("Rejected request: {} - {}", status, message);
        } else {
            tracing::error!("Error: {} - {}", status, message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<ReconcileError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_callbacks() {
        assert!(is_valid_callback("jsonp1234"));
        assert!(is_valid_callback("jQuery.callbacks._$1"));
    }

    #[test]
    fn test_invalid_callbacks() {
        assert!(!is_valid_callback(""));
        assert!(!is_valid_callback("1abc"));
        assert!(!is_valid_callback("alert(1);x"));
        assert!(!is_valid_callback("a b"));
        assert!(!is_valid_callback(&"a".repeat(129)));
    }

    #[test]
    fn test_bad_query_is_client_error() {
        let response = AppError::from(ReconcileError::InvalidQuery("queries".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
