//! HTTP surface for sheetdrop.
//!
//! Exposes the upload → process → query pipeline and the image relay as a
//! JSON HTTP API for the desktop and browser clients.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Plain-text liveness banner |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/upload` | Accept a CSV/XLSX file (multipart `file`) |
//! | `POST` | `/process` | Parse, normalize, and store an uploaded file |
//! | `GET`  | `/get_data/{file_id}` | Full record set of a stored dataset |
//! | `POST` | `/search` | Substring search within a stored dataset |
//! | `POST` | `/upload_image` | Attach an image (multipart `image` + `file_id`) |
//! | `GET`  | `/get_image/{filename}` | Image bytes, with placeholder fallback |
//!
//! # Error Contract
//!
//! Every error response is a flat JSON body:
//!
//! ```json
//! { "error": "invalid file type, expected .csv or .xlsx" }
//! ```
//!
//! Client input problems are 400, missing files on disk are 404, and parse
//! or IO failures during processing are 500. Unknown dataset ids are NOT
//! errors by default: `/get_data` and `/search` answer with empty
//! collections so clients stay simple. Setting `server.strict_lookup = true`
//! switches those lookups to 404.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    body::Bytes,
    extract::rejection::JsonRejection,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::images::{self, ImageError};
use crate::ingest::{self, IngestError};
use crate::models::Record;
use crate::normalize;
use crate::search::search_records;
use crate::store::DatasetStore;

/// Records included in the `process` response preview.
const PREVIEW_ROWS: usize = 5;

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor. The store is the only cross-request mutable state.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<DatasetStore>,
}

/// Starts the HTTP server.
///
/// Creates the upload and image directories, binds to the address from
/// `[server].bind`, and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    std::fs::create_dir_all(&config.storage.upload_dir)?;
    std::fs::create_dir_all(&config.storage.image_dir)?;

    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(DatasetStore::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/upload", post(handle_upload))
        .route("/process", post(handle_process))
        .route("/get_data/{file_id}", get(handle_get_data))
        .route("/search", post(handle_search))
        .route("/upload_image", post(handle_upload_image))
        .route("/get_image/{filename}", get(handle_get_image))
        .layer(DefaultBodyLimit::max(state.config.storage.max_upload_bytes))
        .layer(cors)
        .with_state(state);

    println!("sheetdrop listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error body. The wire contract is flat: `{"error": message}`.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
    }
}

fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

/// Unsupported formats are the caller's fault; parse and IO failures during
/// processing are ours.
fn classify_ingest_error(err: IngestError) -> AppError {
    match &err {
        IngestError::UnsupportedFormat(_) => bad_request(err.to_string()),
        IngestError::Parse(_) | IngestError::Io(_) => {
            error!(error = %err, "processing failed");
            internal_error(format!("processing failed: {}", err))
        }
    }
}

fn classify_image_error(err: ImageError) -> AppError {
    match &err {
        ImageError::InvalidFormat(_) => bad_request(err.to_string()),
        ImageError::NotFound(_) => not_found(err.to_string()),
        ImageError::Io(_) => {
            error!(error = %err, "image relay failed");
            internal_error(err.to_string())
        }
    }
}

// ============ GET / and /health ============

async fn handle_root() -> &'static str {
    "sheetdrop is running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /upload ============

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    filename: String,
}

fn is_spreadsheet(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".csv") || lower.ends_with(".xlsx")
}

/// Handler for `POST /upload`.
///
/// Accepts one multipart `file` part, validates the extension, and saves it
/// under the upload directory with a sanitized name. The returned `filename`
/// is exactly what `/process` accepts.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().map(str::to_string).unwrap_or_default();
        if original.is_empty() {
            return Err(bad_request("no file selected"));
        }
        if !is_spreadsheet(&original) {
            return Err(bad_request("invalid file type, expected .csv or .xlsx"));
        }

        let filename = images::sanitize_filename(&original);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(e.to_string()))?;

        let dest = state.config.storage.upload_dir.join(&filename);
        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|e| internal_error(format!("failed to save upload: {}", e)))?;

        info!(filename = %filename, bytes = bytes.len(), "spreadsheet uploaded");
        return Ok(Json(UploadResponse {
            message: "file uploaded successfully".to_string(),
            filename,
        }));
    }

    Err(bad_request("no file uploaded"))
}

// ============ POST /process ============

#[derive(Deserialize)]
struct ProcessRequest {
    filename: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<Vec<Record>>,
}

/// Handler for `POST /process`.
///
/// Parses a previously uploaded file, normalizes it, and stores the record
/// set under a fresh dataset id. An empty file answers with a message and
/// no id, and nothing is stored.
async fn handle_process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    let filename = images::sanitize_filename(&req.filename);
    if filename.is_empty() {
        return Err(bad_request("no filename provided"));
    }

    let path = state.config.storage.upload_dir.join(&filename);
    if !path.is_file() {
        return Err(not_found("file not found"));
    }

    let table = ingest::read_table(&path).map_err(classify_ingest_error)?;
    if table.is_empty() {
        return Ok(Json(ProcessResponse {
            message: "file is empty".to_string(),
            file_id: None,
            preview: None,
        }));
    }

    let records = normalize::normalize_table(&table, &state.config.server.public_base());
    let preview: Vec<Record> = records.iter().take(PREVIEW_ROWS).cloned().collect();
    let row_count = records.len();
    let file_id = state.store.put(records);

    info!(file_id = %file_id, rows = row_count, filename = %filename, "dataset stored");
    Ok(Json(ProcessResponse {
        message: "file processed successfully".to_string(),
        file_id: Some(file_id),
        preview: Some(preview),
    }))
}

// ============ GET /get_data/{file_id} ============

#[derive(Serialize)]
struct DataResponse {
    data: Vec<Record>,
}

/// Handler for `GET /get_data/{file_id}`.
async fn handle_get_data(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<DataResponse>, AppError> {
    match state.store.get(&file_id) {
        Some(records) => Ok(Json(DataResponse {
            data: records.to_vec(),
        })),
        None if state.config.server.strict_lookup => {
            Err(not_found(format!("unknown dataset: {}", file_id)))
        }
        None => Ok(Json(DataResponse { data: Vec::new() })),
    }
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchRequest {
    file_id: String,
    query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<Record>,
}

/// Handler for `POST /search`.
async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    match state.store.get(&req.file_id) {
        Some(records) => Ok(Json(SearchResponse {
            results: search_records(&records, &req.query),
        })),
        None if state.config.server.strict_lookup => {
            Err(not_found(format!("unknown dataset: {}", req.file_id)))
        }
        None => Ok(Json(SearchResponse {
            results: Vec::new(),
        })),
    }
}

// ============ POST /upload_image ============

#[derive(Serialize)]
struct UploadImageResponse {
    message: String,
    image_url: String,
}

/// Handler for `POST /upload_image`.
///
/// Expects a multipart form with a text `file_id` field and an `image` file
/// part. The stored image is keyed by the dataset id so multiple datasets
/// can attach images with the same original name.
async fn handle_upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, AppError> {
    let mut file_id: Option<String> = None;
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        let part = field.name().map(str::to_string).unwrap_or_default();
        match part.as_str() {
            "file_id" => {
                file_id = Some(field.text().await.map_err(|e| bad_request(e.to_string()))?);
            }
            "image" => {
                let name = field.file_name().map(str::to_string).unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(e.to_string()))?;
                image = Some((name, bytes));
            }
            _ => {}
        }
    }

    let file_id = file_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("no file id provided"))?;
    let (name, bytes) = image.ok_or_else(|| bad_request("no image uploaded"))?;
    if name.is_empty() {
        return Err(bad_request("no image selected"));
    }

    let stored = images::store_image(&state.config.storage.image_dir, &file_id, &name, &bytes)
        .map_err(classify_image_error)?;
    let image_url = normalize::retrieval_url(&state.config.server.public_base(), &stored);

    info!(name = %stored, bytes = bytes.len(), "image stored");
    Ok(Json(UploadImageResponse {
        message: "image uploaded successfully".to_string(),
        image_url,
    }))
}

// ============ GET /get_image/{filename} ============

/// Handler for `GET /get_image/{filename}`.
///
/// Streams the named image, or a placeholder when it is missing. Only when
/// no placeholder asset exists does this answer 404.
async fn handle_get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let (bytes, mime) = images::retrieve_image(&state.config.storage.image_dir, &filename)
        .map_err(classify_image_error)?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
