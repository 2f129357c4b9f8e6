//! HTTP API routes.

use axum::{
    extract::{Path, Query, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use roam_common::logging::generate_trace_id;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

use crate::error::RecommendError;
use crate::loader::DataSources;
use crate::recommender::{RecommendationResponse, Recommender};
use crate::table::{Category, RawTable};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub sources: Arc<DataSources>,
}

impl AppState {
    pub fn new(recommender: Recommender, sources: DataSources) -> Self {
        Self {
            recommender: Arc::new(recommender),
            sources: Arc::new(sources),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Search form endpoint
        .route("/search", post(search))
        // Query API
        .route("/api/v1/recommendations", get(get_recommendations))
        .route("/api/v1/locations", get(list_locations))
        // Data management
        .route("/api/v1/datasets/:category", put(replace_dataset))
        .route("/api/v1/reload", post(reload))
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

/// Tag every request with a trace id span.
async fn trace_requests(request: Request, next: Next) -> Response {
    let span = info_span!(
        "http",
        trace_id = %generate_trace_id(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "Request handled");
        response
    }
    .instrument(span)
    .await
}

// ============ Health Check ============

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.recommender.snapshot();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "roam-recommender",
        "version": env!("CARGO_PKG_VERSION"),
        "catalog": {
            "dining": catalog.dining.len(),
            "attractions": catalog.attractions.len(),
            "built_at": catalog.built_at,
        }
    }))
}

// ============ Recommendations ============

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    location: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<RecommendationResponse>, RecommendError> {
    let location = request.location.unwrap_or_default();
    let response = state.recommender.recommend(&location, None)?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    #[serde(default)]
    location: Option<String>,
    limit: Option<usize>,
}

async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, RecommendError> {
    let location = query.location.unwrap_or_default();
    let response = state.recommender.recommend(&location, query.limit)?;
    Ok(Json(response))
}

async fn list_locations(State(state): State<AppState>) -> impl IntoResponse {
    let locations = state.recommender.locations();
    Json(serde_json::json!({
        "count": locations.len(),
        "locations": locations,
    }))
}

// ============ Data Management ============

async fn replace_dataset(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(table): Json<RawTable>,
) -> Result<impl IntoResponse, RecommendError> {
    let category: Category = category.parse().map_err(RecommendError::InvalidQuery)?;
    let table = RawTable::from_rows(table.columns, table.rows);

    let summary = state.recommender.rebuild(category, &table)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": summary
    })))
}

async fn reload(State(state): State<AppState>) -> Result<impl IntoResponse, RecommendError> {
    if !state.sources.is_configured() {
        return Err(RecommendError::Config(
            "no CSV sources configured".to_string(),
        ));
    }

    let sources = state.sources.clone();
    let recommender = state.recommender.clone();
    let summaries = tokio::task::spawn_blocking(move || {
        let (dining, attractions) = sources.load(&recommender.options().rules)?;
        recommender.replace(&dining, &attractions)
    })
    .await
    .map_err(|e| RecommendError::Internal(format!("reload task failed: {}", e)))??;

    info!("Datasets reloaded from CSV");

    Ok(Json(serde_json::json!({
        "success": true,
        "data": summaries
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::RecommenderOptions;
    use crate::sentiment::LexiconScorer;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let attractions = RawTable::from_strs(
            &["Name", "City", "Review"],
            &[
                &["Park A", "Lakeview", "amazing and beautiful"],
                &["Park B", "Lakeview", "terrible, dirty"],
            ],
        );
        let dining = RawTable::from_strs(&["place", "location", "review"], &[]);
        let recommender = Recommender::build(
            &dining,
            &attractions,
            Arc::new(LexiconScorer::new()),
            RecommenderOptions::default(),
        )
        .unwrap();
        build_router(AppState::new(recommender, DataSources::default()))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["service"], "roam-recommender");
        assert_eq!(json["catalog"]["attractions"], 2);
    }

    #[tokio::test]
    async fn test_search() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/search")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"location": "Lakeview"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["places"][0]["name"], "Park A");
        assert_eq!(json["places"][0]["location"], "Lakeview");
        assert_eq!(json["dining"].as_array().unwrap().len(), 0);
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn test_search_without_location() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/search")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "INVALID_QUERY");
        assert_eq!(json["error"]["message"], "Invalid query: location is required");
    }

    #[tokio::test]
    async fn test_unknown_category() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/datasets/museums")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"columns": ["place"], "rows": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reload_without_sources() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CONFIG_ERROR");
    }
}
