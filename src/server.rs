//! HTTP API over the image store.
//!
//! | Route | Response |
//! |---|---|
//! | `GET /api/images` | [`ImagesResponse`]: page of images + `total` |
//! | `GET /api/images.json` | [`LegacyImagesResponse`]: page of images + `hasMore` |
//! | `GET /api/collections` | [`CollectionsResponse`] |
//! | `GET /health` | `{ "status": "ok" }` |
//! | `GET <asset_url_prefix>/*` | image files from the image directory |
//!
//! Handlers are stateless: each request re-reads the manifest on the blocking
//! pool and shares only the immutable [`ImageStore`]. Any store failure is
//! logged and answered with a generic `500 { "error": ... }` body; the detail
//! never leaves the server.

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::{
    ApiImage, CollectionsResponse, ErrorResponse, ImagesParams, ImagesResponse, LegacyImage,
    LegacyImagesResponse,
};
use crate::store::{ImageQuery, ImageStore, StoreError};

const GENERIC_ERROR: &str = "Failed to fetch images";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        let body = ErrorResponse {
            error: GENERIC_ERROR.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Where image files are served from.
#[derive(Debug, Clone)]
pub struct AssetMount {
    /// URL prefix, e.g. `/assets`.
    pub url_prefix: String,
    /// Directory on disk, e.g. `<site_root>/src`.
    pub dir: PathBuf,
}

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<ImageStore>,
    /// Page size when a request has no usable `limit`.
    pub default_limit: usize,
    pub assets: Option<AssetMount>,
}

impl AppState {
    pub fn new(store: ImageStore, default_limit: usize) -> Self {
        Self {
            store: Arc::new(store),
            default_limit,
            assets: None,
        }
    }

    pub fn with_assets(mut self, url_prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.assets = Some(AssetMount {
            url_prefix: url_prefix.into(),
            dir: dir.into(),
        });
        self
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/images", get(list_images))
        .route("/api/images.json", get(list_images_legacy))
        .route("/api/collections", get(list_collections))
        .route("/health", get(health_check));

    if let Some(mount) = &state.assets {
        router = router.nest_service(&mount.url_prefix, ServeDir::new(&mount.dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind `addr` and serve `router` until Ctrl-C.
pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

/// Run a store call on the blocking pool.
async fn run_store<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&ImageStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn page_query(params: &ImagesParams, default_limit: usize) -> ImageQuery {
    ImageQuery {
        collection: params.collection(),
        page: Some(params.page()),
        limit: Some(params.limit(default_limit)),
        ..ImageQuery::default()
    }
}

/// GET /api/images
pub async fn list_images(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ImagesResponse>> {
    let params = ImagesParams::from_query(query.as_deref());
    let query = page_query(&params, state.default_limit);
    let page = run_store(&state, move |store| store.get_images(&query)).await?;

    Ok(Json(ImagesResponse {
        images: page.images.iter().map(ApiImage::from).collect(),
        total: page.total,
    }))
}

/// GET /api/images.json
pub async fn list_images_legacy(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<LegacyImagesResponse>> {
    let params = ImagesParams::from_query(query.as_deref());
    let query = page_query(&params, state.default_limit);
    let end = params
        .page()
        .saturating_mul(params.limit(state.default_limit));
    let page = run_store(&state, move |store| store.get_images(&query)).await?;

    Ok(Json(LegacyImagesResponse {
        images: page.images.iter().map(LegacyImage::from).collect(),
        has_more: end < page.total,
    }))
}

/// GET /api/collections
pub async fn list_collections(
    State(state): State<AppState>,
) -> ApiResult<Json<CollectionsResponse>> {
    let collections = run_store(&state, |store| store.get_collections(None)).await?;
    Ok(Json(CollectionsResponse { collections }))
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
