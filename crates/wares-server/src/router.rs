//! API router using Axum
//!
//! Routes delegate to wares-core; the stats endpoint is served through the
//! single-flight cache so concurrent requests share one recompute.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error};
use wares_core::query::{filter_and_paginate, ListQuery};
use wares_core::{
    CoreError, DatasetStore, Item, ItemPage, JsonFileStore, NewItem, StatsCache, StatsSnapshot,
};

/// Shared handler state: one store, one stats cache per process.
pub struct AppState {
    pub store: Arc<JsonFileStore>,
    pub stats: StatsCache<JsonFileStore>,
}

impl AppState {
    pub fn new(store: Arc<JsonFileStore>) -> Self {
        Self {
            stats: StatsCache::new(Arc::clone(&store)),
            store,
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/{id}", get(get_item))
        .route("/api/stats", get(get_stats))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Error wrapper mapping core failures to `{"error": ...}` bodies.
struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            error!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// GET /api/items
async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ItemPage>, ApiError> {
    let items = state.store.read_all().await?;
    let page = filter_and_paginate(items, &query);

    debug!(
        q = query.q.as_deref().unwrap_or(""),
        page = page.page,
        total = page.total,
        "Items listed"
    );

    Ok(Json(page))
}

/// GET /api/items/{id}
async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, ApiError> {
    let item = state.store.find(id).await?;
    Ok(Json(item))
}

/// POST /api/items
///
/// Payload validation is intentionally absent, matching the store's
/// tolerance for sparse records.
async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let item = state.store.append(new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/stats
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsSnapshot>, ApiError> {
    let snapshot = state.stats.get().await?;
    Ok(Json(snapshot))
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
