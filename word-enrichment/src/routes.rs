use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::enrichment::{enrich, ContentGenerator, EnrichmentError};
use crate::storage::{Catalog, SearchLanguage, SearchPage, SearchQuery, StoreError, WordStore};
use crate::words::{CefrLevel, WordDetails};

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;
const MIN_SEARCH_LENGTH: usize = 2;

/// Shared, read-only per process.
pub struct AppState<G> {
    pub generator: G,
    pub store: WordStore,
}

// ─── Request / Response types ────────────────────────────────

#[derive(Deserialize)]
pub struct LevelParams {
    cefr: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    cefr: Option<String>,
    lang: Option<String>,
    limit: Option<usize>,
    skip: Option<usize>,
}

#[derive(Serialize)]
struct CatalogResponse {
    words: Catalog,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<Vec<String>>,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
            suggestions: None,
        }
    }

    fn rejected(status: StatusCode, detail: String) -> Self {
        Self {
            status,
            detail,
            suggestions: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<EnrichmentError> for ApiError {
    fn from(error: EnrichmentError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: error.to_string(),
            suggestions: None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                detail: error.to_string(),
                suggestions: None,
            },
            other => {
                tracing::error!(error = %other, "word store failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "An error occurred while reading the word store".to_owned(),
                    suggestions: None,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// ─── Routes ──────────────────────────────────────────────────

pub fn router<G>(state: Arc<AppState<G>>) -> Router
where
    G: ContentGenerator + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(health_check))
        .route("/words/detail", post(word_detail::<G>))
        .route("/words/lookup/:word", get(lookup_word::<G>))
        .route("/words/list", get(list_words::<G>))
        .route("/words/search", get(search_words::<G>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Handlers ────────────────────────────────────────────────

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn word_detail<G: ContentGenerator + Send + Sync>(
    State(state): State<Arc<AppState<G>>>,
    details: Result<Json<WordDetails>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(details) = details?;
    let enrichment = enrich(&state.generator, &details).await?;
    tracing::info!(word = %enrichment.english, "word enriched");
    Ok(Json(json!({
        "message": "Word enriched successfully",
        "data": enrichment,
    })))
}

async fn lookup_word<G: Send + Sync>(
    State(state): State<Arc<AppState<G>>>,
    word: Result<Path<String>, PathRejection>,
    params: Result<Query<LevelParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let (Path(word), Query(params)) = (word?, params?);
    let level = parse_level(params.cefr.as_deref())?;
    match state.store.lookup(&word, level).await {
        Ok(record) => Ok(Json(record)),
        Err(error @ StoreError::NotFound { .. }) => {
            let mut api_error = ApiError::from(error);
            api_error.suggestions = Some(state.store.suggest(&word).await);
            Err(api_error)
        }
        Err(error) => Err(error.into()),
    }
}

async fn list_words<G: Send + Sync>(
    State(state): State<Arc<AppState<G>>>,
    params: Result<Query<LevelParams>, QueryRejection>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let Query(params) = params?;
    let level = parse_level(params.cefr.as_deref())?;
    let words = state.store.list(level).await?;
    Ok(Json(CatalogResponse { words }))
}

async fn search_words<G: Send + Sync>(
    State(state): State<Arc<AppState<G>>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchPage>, ApiError> {
    let Query(params) = params?;
    let query = search_query(params)?;
    Ok(Json(state.store.search(&query).await?))
}

fn parse_level(raw: Option<&str>) -> Result<Option<CefrLevel>, ApiError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse::<CefrLevel>()
            .map(Some)
            .map_err(|error| ApiError::bad_request(error.to_string())),
        None => Ok(None),
    }
}

fn search_query(params: SearchParams) -> Result<SearchQuery, ApiError> {
    let text = params
        .q
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_lowercase();
    if text.chars().count() < MIN_SEARCH_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Search query must be at least {MIN_SEARCH_LENGTH} characters"
        )));
    }
    let language = match params.lang.as_deref() {
        Some(lang) => lang
            .parse::<SearchLanguage>()
            .map_err(|error| ApiError::bad_request(error.to_string()))?,
        None => SearchLanguage::All,
    };
    Ok(SearchQuery {
        text,
        level: parse_level(params.cefr.as_deref())?,
        language,
        limit: params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT),
        skip: params.skip.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::enrichment::tests::CannedGenerator;
    use crate::storage::tests::fixture_store;

    const ENRICHED_RUN: &str = r#"{"English":"run","Turkish":"koşmak","CEFR":"A1","type":"verb","definition":"move fast on foot","example":{"en":"I run.","tr":"Koşarım.","extra":"x"}}"#;

    struct TestApp {
        _tmp: tempfile::TempDir,
        router: Router,
    }

    impl TestApp {
        fn new(generator: CannedGenerator) -> Self {
            let (tmp, store) = fixture_store();
            let router = router(Arc::new(AppState { generator, store }));
            Self { _tmp: tmp, router }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn details_body() -> Value {
        json!({"CEFR": "A1", "type": "verb", "English": "run", "Turkish": "koşmak"})
    }

    #[tokio::test]
    async fn health_check_reports_ok() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, body) = app.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn detail_returns_normalized_enrichment() {
        let app = TestApp::new(CannedGenerator::ok(ENRICHED_RUN));
        let (status, body) = app.post_json("/words/detail", details_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Word enriched successfully");
        assert_eq!(body["data"]["synonyms"], json!([]));
        assert_eq!(body["data"]["example"], json!({"en": "I run.", "tr": "Koşarım."}));
    }

    #[tokio::test]
    async fn detail_failures_are_server_errors() {
        let app = TestApp::new(CannedGenerator::ok("not json at all"));
        let (status, body) = app.post_json("/words/detail", details_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Invalid JSON in model response"));
        assert!(!detail.contains("not json at all"));

        let app = TestApp::new(CannedGenerator::failing(503));
        let (status, body) = app.post_json("/words/detail", details_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().starts_with("Error processing request"));
    }

    #[tokio::test]
    async fn malformed_detail_body_reports_detail() {
        let app = TestApp::new(CannedGenerator::ok(ENRICHED_RUN));
        let (status, body) = app.post_json("/words/detail", json!({"CEFR": "A1"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("missing field `type`"));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/words/detail")
            .body(Body::from(details_body().to_string()))
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn malformed_query_reports_detail() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, body) = app.get("/words/search?q=run&limit=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Failed to deserialize query string"));
    }

    #[tokio::test]
    async fn lookup_folds_case_and_filters_level() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, body) = app.get("/words/lookup/Run?cefr=A1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Turkish"], "koşmak");

        let (status, body) = app.get("/words/lookup/run?cefr=c1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Turkish"], "yönetmek");
    }

    #[tokio::test]
    async fn lookup_miss_is_not_found_with_suggestions() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, body) = app.get("/words/lookup/runn").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Word 'runn' not found");
        assert_eq!(body["suggestions"][0], "run");

        let (status, _) = app.get("/words/lookup/zzz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_level_is_a_bad_request() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, body) = app.get("/words/list?cefr=z9").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Unknown CEFR level 'z9'");
    }

    #[tokio::test]
    async fn list_returns_catalog() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, body) = app.get("/words/list?cefr=a1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"words": {"a1": ["jump", "run"]}}));

        let (_, body) = app.get("/words/list?cefr=b1").await;
        assert_eq!(body, json!({"words": {"b1": []}}));

        let (_, body) = app.get("/words/list").await;
        assert_eq!(body["words"]["b2"], json!(["runway"]));
    }

    #[tokio::test]
    async fn search_validates_and_pages() {
        let app = TestApp::new(CannedGenerator::ok("{}"));
        let (status, _) = app.get("/words/search?q=r").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = app.get("/words/search?q=run&lang=de").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app.get("/words/search?q=RUN&lang=en&limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["results"][0]["cefr"], "a1");
        assert_eq!(body["results"][1]["record"]["Turkish"], "yönetmek");
    }
}
