//! HTTP JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/health` | Health check (returns version and upload limits) |
//! | `GET`  | `/api/documents` | Paginated document list (`page`, `per_page`) |
//! | `GET`  | `/api/documents/{id}` | One document with full content |
//! | `GET`  | `/api/search` | Search (`q`, `mode`, `limit`) |
//! | `GET`  | `/api/statistics` | Corpus statistics |
//! | `GET`  | `/api/classifications` | Classifications present in the corpus |
//! | `POST` | `/api/classify` | Classify `{ "content": "..." }` without storing it |
//! | `POST` | `/api/upload` | Multipart upload, field `file` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Search query is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `payload_too_large` (413), `internal` (500).
//!
//! # CORS
//!
//! Origins come from `[server].cors_origins`; `"*"` allows any origin.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use doclens_core::classify::Classifier;
use doclens_core::models::Document;
use doclens_core::stats::Statistics;
use doclens_core::store::DocumentStore;

use crate::classify::{classify_text, ClassifyResponse};
use crate::config::Config;
use crate::get::{list_documents, DocumentPage, DocumentSummary};
use crate::ingest::{ingest_bytes, validate_upload, IngestOutcome};
use crate::search::{search_documents, SearchResponse};
use crate::sqlite_store::SqliteStore;
use crate::stats::{classifications, statistics};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn DocumentStore>,
    classifier: Arc<Classifier>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, classifier: Classifier) -> Self {
        Self {
            config: Arc::new(config),
            store,
            classifier: Arc::new(classifier),
        }
    }
}

/// Build the `/api` router with CORS and the upload body limit applied.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.server.cors_origins)?;
    let body_limit =
        state.config.upload.max_file_size_bytes() as usize + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/documents", get(handle_list_documents))
        .route("/documents/{id}", get(handle_get_document))
        .route("/search", get(handle_search))
        .route("/statistics", get(handle_statistics))
        .route("/classifications", get(handle_classifications))
        .route("/classify", post(handle_classify))
        .route("/upload", post(handle_upload));

    Ok(Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }
    let values = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(values)))
}

/// Starts the HTTP server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let classifier = config.classifier.build()?;
    let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::open(config).await?);
    let app = build_router(AppState::new(config.clone(), store, classifier))?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "server started");
    println!("DocLens API listening on http://{}/api", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn payload_too_large(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::PAYLOAD_TOO_LARGE,
        code: "payload_too_large".to_string(),
        message: message.into(),
    }
}

/// Storage and other unexpected failures. Logged, then reported as 500.
fn internal(err: anyhow::Error) -> AppError {
    tracing::error!(error = %format!("{:#}", err), "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        payload_too_large(err.body_text())
    } else {
        bad_request(err.body_text())
    }
}

// ============ GET /api/health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"healthy"` when the server is running.
    status: String,
    version: String,
    timestamp: String,
    upload_config: UploadLimits,
}

#[derive(Serialize)]
struct UploadLimits {
    max_file_size_mb: u64,
    allowed_extensions: Vec<String>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        upload_config: UploadLimits {
            max_file_size_mb: state.config.upload.max_file_size_mb,
            allowed_extensions: state.config.upload.allowed_extensions.clone(),
        },
    })
}

// ============ GET /api/documents ============

#[derive(Deserialize)]
struct ListParams {
    page: Option<usize>,
    per_page: Option<usize>,
}

async fn handle_list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<DocumentPage>, AppError> {
    let page = list_documents(state.store.as_ref(), params.page, params.per_page)
        .await
        .map_err(internal)?;
    Ok(Json(page))
}

// ============ GET /api/documents/{id} ============

async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    match state.store.get_document(&id).await.map_err(internal)? {
        Some(doc) => Ok(Json(doc)),
        None => Err(not_found(format!("document not found: {}", id))),
    }
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    mode: Option<String>,
    limit: Option<usize>,
}

/// Returns `400` for a missing/blank `q` or an unknown `mode`.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("Search query is required"));
    }
    let mode = state
        .config
        .search
        .resolve_mode(params.mode.as_deref())
        .map_err(|e| bad_request(e.to_string()))?;

    let response = search_documents(
        &state.config,
        state.store.as_ref(),
        &params.q,
        mode,
        params.limit,
    )
    .await
    .map_err(internal)?;
    Ok(Json(response))
}

// ============ GET /api/statistics ============

async fn handle_statistics(State(state): State<AppState>) -> Result<Json<Statistics>, AppError> {
    let stats = statistics(state.store.as_ref()).await.map_err(internal)?;
    Ok(Json(stats))
}

// ============ GET /api/classifications ============

#[derive(Serialize)]
struct ClassificationsResponse {
    categories: Vec<String>,
    total_categories: usize,
}

async fn handle_classifications(
    State(state): State<AppState>,
) -> Result<Json<ClassificationsResponse>, AppError> {
    let categories = classifications(state.store.as_ref())
        .await
        .map_err(internal)?;
    Ok(Json(ClassificationsResponse {
        total_categories: categories.len(),
        categories,
    }))
}

// ============ POST /api/classify ============

#[derive(Deserialize)]
struct ClassifyRequest {
    content: Option<String>,
}

async fn handle_classify(
    State(state): State<AppState>,
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let content = body
        .ok()
        .and_then(|Json(req)| req.content)
        .unwrap_or_default();
    let response =
        classify_text(&state.classifier, &content).map_err(|e| bad_request(e.to_string()))?;
    Ok(Json(response))
}

// ============ POST /api/upload ============

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    message: String,
    duplicate: bool,
    document: DocumentSummary,
}

/// Accepts the first multipart field named `file`.
///
/// Returns `400` when the field is missing or the file type is not allowed,
/// and `413` when the file exceeds `[upload].max_file_size_mb`.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        // keep only the final path component of the client-supplied name
        let filename = field
            .file_name()
            .and_then(|n| std::path::Path::new(n).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if filename.is_empty() {
            return Err(bad_request("No selected file"));
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let config = &state.config;
        if bytes.len() as u64 > config.upload.max_file_size_bytes() {
            return Err(payload_too_large(format!(
                "File exceeds the {} MB upload limit",
                config.upload.max_file_size_mb
            )));
        }
        validate_upload(config, &filename, bytes.len() as u64)
            .map_err(|e| bad_request(e.to_string()))?;

        let outcome = ingest_bytes(
            config,
            &state.classifier,
            state.store.as_ref(),
            &filename,
            &bytes,
        )
        .await
        .map_err(internal)?;

        let (message, duplicate) = match &outcome {
            IngestOutcome::Created(_) => ("File uploaded successfully", false),
            IngestOutcome::Duplicate(_) => ("File was already uploaded", true),
        };
        let document = match outcome {
            IngestOutcome::Created(doc) | IngestOutcome::Duplicate(doc) => doc,
        };
        return Ok(Json(UploadResponse {
            success: true,
            message: message.to_string(),
            duplicate,
            document: DocumentSummary::from(document),
        }));
    }
    Err(bad_request("No file part"))
}
