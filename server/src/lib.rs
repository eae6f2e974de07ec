use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use ftsearch::{AutocompleteSuggestion, DocId, DocumentAdapter, JsonAdapter, Pipeline, SearchEngine, SearchQuery, SearchResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// One engine shared by every request. Writers take the lock exclusively, so
/// mutations are serialized and readers never see a half-applied change.
pub type SharedIndex = Arc<RwLock<SearchEngine<JsonAdapter>>>;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub id_field: String,
    pub ignore: Vec<String>,
    pub no_stem: bool,
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { id_field: "id".into(), ignore: Vec::new(), no_stem: false, admin_token: None }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    pub admin_token: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Comma-separated property names to restrict matching to.
    pub fields: Option<String>,
}

#[derive(Deserialize)]
pub struct AutocompleteParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct AutocompleteResponse {
    pub query: String,
    pub suggestions: Vec<AutocompleteSuggestion>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub size: usize,
    pub token_count: usize,
}

#[derive(Serialize)]
pub struct BatchError {
    pub position: usize,
    pub error: String,
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub indexed: usize,
    pub duplicates: usize,
    pub new_tokens: usize,
    pub errors: Vec<BatchError>,
}

pub fn build_index(config: &AppConfig) -> SearchEngine<JsonAdapter> {
    let adapter = config
        .ignore
        .iter()
        .fold(JsonAdapter::new(config.id_field.clone()), |adapter, field| adapter.ignore(field.clone()));
    let pipeline = if config.no_stem { Pipeline::literal() } else { Pipeline::standard() };
    SearchEngine::new(adapter, pipeline)
}

pub fn build_app(config: AppConfig) -> Router {
    let app_state = AppState { index: Arc::new(RwLock::new(build_index(&config))), admin_token: config.admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/stats", get(stats_handler))
        .route("/doc/:doc_id", delete(remove_handler))
        .route("/index/batch", post(index_batch))
        .route("/index/clear", post(index_clear))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let mut query = SearchQuery::new(params.q.clone());
    if let Some(fields) = &params.fields {
        query = query.select(fields.split(',').map(str::trim).filter(|f| !f.is_empty()));
    }

    let mut results = state
        .index
        .read()
        .search(query)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let total_hits = results.len();
    results.truncate(params.k.clamp(1, 100));

    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query = %params.q, total_hits, took_s, "search served");
    Ok(Json(SearchResponse { query: params.q, took_s, total_hits, results }))
}

pub async fn autocomplete_handler(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Json<AutocompleteResponse> {
    let mut suggestions = state.index.read().autocomplete(&params.q);
    suggestions.truncate(params.k.clamp(1, 100));
    Json(AutocompleteResponse { query: params.q, suggestions })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let index = state.index.read();
    Json(StatsResponse { size: index.size(), token_count: index.token_count() })
}

// --- Admin endpoints ---
async fn index_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<BatchResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let docs = match payload {
        Value::Array(docs) => docs,
        doc @ Value::Object(_) => vec![doc],
        _ => return Err((StatusCode::BAD_REQUEST, "expected a JSON object or array of objects".into())),
    };

    let mut response = BatchResponse { indexed: 0, duplicates: 0, new_tokens: 0, errors: Vec::new() };
    let mut index = state.index.write();
    for (position, doc) in docs.iter().enumerate() {
        let is_duplicate = index.adapter().doc_id(doc).map(|id| index.contains(id)).unwrap_or(false);
        if is_duplicate {
            response.duplicates += 1;
            continue;
        }
        match index.add(doc) {
            Ok(new_tokens) => {
                response.indexed += 1;
                response.new_tokens += new_tokens;
            }
            Err(e) => response.errors.push(BatchError { position, error: e.to_string() }),
        }
    }
    tracing::info!(
        indexed = response.indexed,
        duplicates = response.duplicates,
        errors = response.errors.len(),
        size = index.size(),
        "batch indexed"
    );
    Ok(Json(response))
}

async fn remove_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
) -> Result<Json<Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let removed = state.index.write().remove_id(doc_id);
    Ok(Json(serde_json::json!({ "doc_id": doc_id, "removed": removed })))
}

async fn index_clear(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    state.index.write().clear();
    Ok(Json(serde_json::json!({ "cleared": true })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let Some(required) = &state.admin_token else {
        return Ok(());
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
