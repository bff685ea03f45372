//! HTTP query endpoint.
//!
//! The bundle and page maps are loaded once at startup and shared read-only
//! by every handler.

use crate::assembly::{SearchResponse, assemble};
use crate::config::Config;
use crate::error::IndexerError;
use crate::persistence::{IndexBundle, IndexSummary, PageMaps, load_bundle, load_pages_or_empty};
use crate::search::SearchEngine;
use crate::section::SectionId;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across all handlers
pub struct AppState {
    pub bundle: IndexBundle,
    pub pages: PageMaps,
    pub config: Config,
}

impl AppState {
    /// Load the persisted bundle and page maps named by `config`.
    ///
    /// Missing page maps are tolerated; every section is then unlocated.
    pub fn load(config: Config) -> crate::Result<Self> {
        let bundle = load_bundle(&config.bundle_path())?;
        let pages = load_pages_or_empty(&config.pages_path())?;

        Ok(Self {
            bundle,
            pages,
            config,
        })
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/search", get(search_get).post(search_post))
        .route("/books", get(list_books))
        .route("/books/{book}/sections/{section}", get(get_section))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind the configured address and serve until the process stops.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let address = state.config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Listening on http://{}", address);

    axum::serve(listener, create_router(state)).await
}

/// Error wrapper for API handlers
pub enum ApiError {
    Indexer(IndexerError),
    BadRequest(String),
}

impl From<IndexerError> for ApiError {
    fn from(e: IndexerError) -> Self {
        ApiError::Indexer(e)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Indexer(e) => {
                let (status, error_type) = match &e {
                    IndexerError::BookNotFound(_) => (StatusCode::NOT_FOUND, "book_not_found"),
                    IndexerError::SectionNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "section_not_found")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
                };
                (status, error_type, e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub strict: bool,
    pub fuzzy: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub strict: bool,
    pub fuzzy: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionResponse {
    pub book: String,
    pub section: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub page: Option<i64>,
}

pub async fn search_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, &req.query, req.strict, req.fuzzy).map(Json)
}

pub async fn search_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, &params.q, params.strict, params.fuzzy).map(Json)
}

fn run_search(
    state: &AppState,
    query: &str,
    strict: bool,
    fuzzy: Option<bool>,
) -> Result<SearchResponse, ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }

    let config = &state.config;
    let fuzzy = fuzzy.unwrap_or(config.search.fuzzy);
    let engine = SearchEngine::new(&state.bundle.index, &config.indexing, config.search.clone());
    let hits = engine.search(query, strict, fuzzy);

    Ok(assemble(&state.bundle, &state.pages, config, &hits))
}

pub async fn list_books(State(state): State<Arc<AppState>>) -> Json<IndexSummary> {
    Json(state.bundle.summary())
}

pub async fn get_section(
    State(state): State<Arc<AppState>>,
    Path((book_name, section_id)): Path<(String, String)>,
) -> Result<Json<SectionResponse>, ApiError> {
    let book = state.bundle.book(&book_name)?;
    let section = book.section(&section_id)?;

    let offset = state.config.book(&book_name).page_offset;
    let id = SectionId::parse(&section_id)?;
    let page = state
        .pages
        .get(&book_name)
        .and_then(|map| map.get(&id))
        .and_then(|entry| entry.page)
        .map(|p| p as i64 + offset);

    Ok(Json(SectionResponse {
        book: book_name,
        section: section_id,
        title: section.title.clone(),
        content: section.content.clone(),
        word_count: section.word_count,
        page,
    }))
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
