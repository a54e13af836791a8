//! JSON inspection API
//!
//! Everything here describes the manifest and registry; asset bytes are
//! never sent.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use fwasset_core::{
    model::{AssetKind, Encoding},
    registry::RegistrySummary,
    AssetEntry, AssetRegistry, CheckReport, ManifestError,
};
use fwasset_sources::{scan_dir, ScanOptions};
use serde::Serialize;
use tower_http::cors::CorsLayer;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Create the main application router
///
/// `check`, `header` and `scan` under `/api/manifest/` are matched before
/// `:symbol`, so entries with those symbols are only reachable through
/// `/api/manifest`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/manifest", get(list_entries))
        .route("/api/manifest/check", get(check_manifest))
        .route("/api/manifest/header", get(manifest_header))
        .route("/api/manifest/scan", get(scan_asset_root))
        .route("/api/manifest/:symbol", get(get_entry))
        .route("/api/version", get(version))
        .route("/api/registry", get(registry_summary))
        .route("/api/registry/reload", post(reload_registry))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Manifest Endpoints ===

#[derive(Serialize)]
struct EntryInfo {
    symbol: String,
    path: String,
    kind: AssetKind,
    encoding: Encoding,
    content_type: &'static str,
    group: Option<String>,
    loaded: bool,
    size: Option<usize>,
    fingerprint: Option<String>,
}

impl EntryInfo {
    fn new(entry: &AssetEntry, registry: &AssetRegistry) -> Self {
        let loaded = registry.get(&entry.symbol);
        Self {
            symbol: entry.symbol.clone(),
            path: entry.path.clone(),
            kind: entry.kind(),
            encoding: entry.encoding(),
            content_type: entry.content_type(),
            group: entry.group().map(str::to_string),
            loaded: loaded.is_some(),
            size: loaded.map(|a| a.len()),
            fingerprint: loaded.map(|a| a.fingerprint().to_string()),
        }
    }
}

async fn list_entries(State(state): State<AppState>) -> Json<Vec<EntryInfo>> {
    let registry = state.registry.read().await;

    let info: Vec<EntryInfo> = registry
        .manifest()
        .iter()
        .map(|entry| EntryInfo::new(entry, &registry))
        .collect();

    Json(info)
}

async fn get_entry(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<EntryInfo>, (StatusCode, String)> {
    let registry = state.registry.read().await;
    let entry = registry
        .manifest()
        .get(&symbol)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown asset: {}", symbol)))?;

    Ok(Json(EntryInfo::new(entry, &registry)))
}

/// Check the manifest the active registry was loaded from. Edits on disk
/// are only seen after a reload.
async fn check_manifest(State(state): State<AppState>) -> Json<CheckReport> {
    let registry = state.registry.read().await;
    Json(registry.manifest().check(state.config.expected_count))
}

async fn manifest_header(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], registry.manifest().render())
}

async fn scan_asset_root(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let root = state.config.asset_root.clone().ok_or((
        StatusCode::BAD_REQUEST,
        "No asset root configured".to_string(),
    ))?;
    let options = ScanOptions {
        name: state.config.manifest_name.clone(),
        ..ScanOptions::default()
    };

    let manifest = tokio::task::spawn_blocking(move || scan_dir(&root, &options))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Scan task failed: {}", e)))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Scan failed: {:#}", e)))?;

    tracing::info!("Scanned asset root: {} entries", manifest.len());
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], manifest.render()))
}

// === Registry Endpoints ===

async fn version(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let registry = state.registry.read().await;
    let version = registry
        .version()
        .ok_or((StatusCode::NOT_FOUND, "No version available".to_string()))?;

    Ok(Json(serde_json::json!({ "version": version })))
}

async fn registry_summary(State(state): State<AppState>) -> Json<RegistrySummary> {
    let registry = state.registry.read().await;
    Json(registry.summary())
}

async fn reload_registry(
    State(state): State<AppState>,
) -> Result<Json<RegistrySummary>, (StatusCode, String)> {
    match state.reload().await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            tracing::warn!("Reload failed: {:#}", e);
            let status = if e.downcast_ref::<ManifestError>().is_some() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err((status, format!("Reload failed: {:#}", e)))
        }
    }
}
