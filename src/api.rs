//! Read-only HTTP surface for browser frontends.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::distribution::{latest_distribution, DistributionTx};
use crate::error::{ExplorerError, QueryError, ResolutionError};
use crate::search::{Explorer, SearchReport};

#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<Explorer>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    ok: bool,
    summary: String,
    #[serde(flatten)]
    report: SearchReport,
}

#[derive(Serialize)]
struct DistributionResponse {
    ok: bool,
    distribution: Option<DistributionTx>,
}

/// Error body: `{ "ok": false, "kind": ..., "error": <user message> }`.
pub struct ApiError(ExplorerError);

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            ExplorerError::Input(_) => (StatusCode::BAD_REQUEST, "input"),
            ExplorerError::Resolution(ResolutionError::DomainNotRegistered { .. }) => {
                (StatusCode::NOT_FOUND, "domain_not_registered")
            }
            ExplorerError::Resolution(ResolutionError::ServiceUnavailable { .. }) => {
                (StatusCode::BAD_GATEWAY, "service_unavailable")
            }
            ExplorerError::Query(QueryError::RpcError { .. }) => (StatusCode::BAD_GATEWAY, "rpc_error"),
            ExplorerError::Query(_) => (StatusCode::BAD_GATEWAY, "ledger_unavailable"),
            ExplorerError::Superseded { .. } => (StatusCode::CONFLICT, "superseded"),
        }
    }
}

impl From<ExplorerError> for ApiError {
    fn from(err: ExplorerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        tracing::warn!(kind, error = %self.0, "Search request failed");
        (
            status,
            Json(serde_json::json!({
                "ok": false,
                "kind": kind,
                "error": self.0.user_message(),
            })),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/airdrops", get(search_query))
        .route("/airdrops/:identifier", get(search_path))
        .route("/distribution/latest", get(distribution))
        .merge(crate::version::router())
        .with_state(state)
        .layer(cors)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn run_search(state: &AppState, raw: &str) -> Result<Json<SearchResponse>, ApiError> {
    let report = state.explorer.search_once(raw).await?;
    Ok(Json(SearchResponse {
        ok: true,
        summary: report.summary(),
        report,
    }))
}

async fn search_path(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, &identifier).await
}

async fn search_query(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, query.q.as_deref().unwrap_or_default()).await
}

async fn distribution(State(state): State<AppState>) -> Result<Json<DistributionResponse>, ApiError> {
    let distribution = latest_distribution(state.explorer.rpc(), state.explorer.airdrop_type())
        .await
        .map_err(ExplorerError::from)?;
    Ok(Json(DistributionResponse {
        ok: true,
        distribution,
    }))
}
