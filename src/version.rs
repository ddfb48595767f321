//! Build and endpoint identity served at `/version`.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::AppState;
use crate::search::Explorer;

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_commit: &'static str,
    /// Fullnode this instance queries
    pub rpc_url: String,
    /// Struct type listed as airdrops
    pub airdrop_type: String,
    pub ts: i64,
}

pub fn version_info(explorer: &Explorer) -> VersionInfo {
    VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        // Injected by release builds
        git_commit: option_env!("GIT_COMMIT").unwrap_or("unknown"),
        rpc_url: explorer.rpc().url().to_string(),
        airdrop_type: explorer.airdrop_type().struct_type(),
        ts: chrono::Utc::now().timestamp(),
    }
}

async fn get_version(State(state): State<AppState>) -> Json<VersionInfo> {
    Json(version_info(&state.explorer))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/version", get(get_version))
}
