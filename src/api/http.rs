//! HTTP API Server
//!
//! Request/response surface for the three roles. Every router carries a
//! catch-panic layer so a fault inside one handler answers 500 for that
//! request alone, and a trace layer for per-request logging.
//!
//! Validation failures (missing or oversized `text`, missing `word`,
//! malformed JSON) answer 4xx synchronously and are never logged as
//! system faults.

use std::sync::Arc;

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::replication::Replicator;
use crate::store::{FollowerStore, LeaderStore, LocalStore, WordCountRead, WordCountTable};

/// Maximum accepted size of the `text` form field in bytes
const MAX_TEXT_LEN: usize = 65535;

/// Shared state for the leader's routes
struct LeaderApi {
    store: Arc<LeaderStore>,
    replicator: Arc<Replicator>,
}

/// Router for the leader role
pub fn leader_router(store: Arc<LeaderStore>, replicator: Arc<Replicator>) -> Router {
    let state = Arc::new(LeaderApi { store, replicator });

    Router::new()
        .route("/post", post(handle_ingest))
        .route("/sync", get(handle_full_sync))
        .route("/health", get(handle_health))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the networked follower role
pub fn follower_router(store: Arc<FollowerStore>) -> Router {
    Router::new()
        .route("/update", post(handle_apply_delta))
        .route("/wordcount", get(handle_follower_wordcount))
        .route("/health", get(handle_health))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Router for the filesystem-derived follower role
pub fn local_router(store: Arc<LocalStore>) -> Router {
    Router::new()
        .route("/update", post(handle_refresh))
        .route("/wordcount", get(handle_local_wordcount))
        .route("/health", get(handle_health))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Bind and serve a role router
pub async fn serve(bind_address: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!("HTTP API listening on {}", bind_address);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Network(format!("HTTP server error: {}", e)))?;

    Ok(())
}

// ============ Request Types ============

#[derive(Deserialize)]
struct IngestForm {
    text: Option<String>,
}

#[derive(Deserialize)]
struct WordQuery {
    word: Option<String>,
}

// ============ Leader Handlers ============

/// POST /post: ingest text, spawn replication, answer 202 immediately.
/// The client never learns the replication outcome.
async fn handle_ingest(
    State(api): State<Arc<LeaderApi>>,
    form: std::result::Result<Form<IngestForm>, FormRejection>,
) -> StatusCode {
    let text = match form {
        Ok(Form(form)) => form.text.unwrap_or_default(),
        Err(_) => return StatusCode::BAD_REQUEST,
    };

    if text.is_empty() || text.len() > MAX_TEXT_LEN {
        return StatusCode::BAD_REQUEST;
    }

    let delta = api.store.ingest(&text).await;

    let replicator = Arc::clone(&api.replicator);
    tokio::spawn(async move {
        replicator.replicate(delta).await;
    });

    StatusCode::ACCEPTED
}

/// GET /sync: full current table, for follower startup resync
async fn handle_full_sync(State(api): State<Arc<LeaderApi>>) -> Json<WordCountTable> {
    Json(api.store.snapshot().await)
}

// ============ Follower Handlers ============

/// POST /update: additive delta merge
async fn handle_apply_delta(
    State(store): State<Arc<FollowerStore>>,
    payload: std::result::Result<Json<WordCountTable>, JsonRejection>,
) -> StatusCode {
    let Ok(Json(delta)) = payload else {
        return StatusCode::BAD_REQUEST;
    };

    store.apply(&delta).await;

    StatusCode::ACCEPTED
}

async fn handle_follower_wordcount(
    State(store): State<Arc<FollowerStore>>,
    Query(query): Query<WordQuery>,
) -> Response {
    lookup(store.as_ref(), query).await
}

// ============ Local Follower Handlers ============

/// POST /update: payload ignored, re-read the shared snapshot file
async fn handle_refresh(State(store): State<Arc<LocalStore>>) -> StatusCode {
    match store.refresh().await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("failed to refresh from snapshot: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn handle_local_wordcount(
    State(store): State<Arc<LocalStore>>,
    Query(query): Query<WordQuery>,
) -> Response {
    lookup(store.as_ref(), query).await
}

// ============ Shared Handlers ============

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

/// GET /wordcount?word=W for any store variant
async fn lookup<S: WordCountRead>(store: &S, query: WordQuery) -> Response {
    let word = match query.word {
        Some(word) if !word.is_empty() => word,
        _ => return StatusCode::BAD_REQUEST.into_response(),
    };

    let count = store.count(&word).await;

    let mut response = WordCountTable::new();
    response.insert(word, count);

    Json(response).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn leader_app() -> (Router, Arc<LeaderStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LeaderStore::open(dir.path()).await.unwrap());
        let replicator = Arc::new(Replicator::new(vec![], &Default::default()).unwrap());
        (leader_router(Arc::clone(&store), replicator), store, dir)
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_table(response: Response) -> WordCountTable {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_leader_ingest_accepted() {
        let (app, store, _dir) = leader_app().await;

        let response = app
            .oneshot(post_form("/post", "text=hello%20world%20hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(store.count("hello").await, 2);
        assert_eq!(store.count("world").await, 1);
    }

    #[tokio::test]
    async fn test_leader_rejects_empty_and_missing_text() {
        let (app, _store, _dir) = leader_app().await;

        let response = app
            .clone()
            .oneshot(post_form("/post", "text="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(post_form("/post", "other=x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leader_rejects_oversized_text() {
        let (app, _store, _dir) = leader_app().await;

        let body = format!("text={}", "a".repeat(MAX_TEXT_LEN + 1));
        let response = app.oneshot(post_form("/post", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leader_full_sync_returns_table() {
        let (app, store, _dir) = leader_app().await;
        store.ingest("a b a").await;

        let response = app.oneshot(get("/sync")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let table = body_table(response).await;
        assert_eq!(table.get("a"), Some(&2));
        assert_eq!(table.get("b"), Some(&1));
    }

    #[tokio::test]
    async fn test_health_on_every_role() {
        let (leader, _store, _dir) = leader_app().await;
        let follower = follower_router(Arc::new(FollowerStore::new()));
        let local_dir = tempfile::tempdir().unwrap();
        let local = local_router(Arc::new(LocalStore::new(local_dir.path())));

        for app in [leader, follower, local] {
            let response = app.oneshot(get("/health")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_follower_update_merges() {
        let store = Arc::new(FollowerStore::new());
        let app = follower_router(Arc::clone(&store));

        let response = app
            .clone()
            .oneshot(post_json("/update", r#"{"go":2}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let response = app
            .oneshot(post_json("/update", r#"{"go":1,"stop":4}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        assert_eq!(store.count("go").await, 3);
        assert_eq!(store.count("stop").await, 4);
    }

    #[tokio::test]
    async fn test_follower_update_rejects_malformed_json() {
        let app = follower_router(Arc::new(FollowerStore::new()));

        let response = app
            .oneshot(post_json("/update", "not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wordcount_requires_word_on_every_role() {
        let follower = follower_router(Arc::new(FollowerStore::new()));
        let local_dir = tempfile::tempdir().unwrap();
        let local = local_router(Arc::new(LocalStore::new(local_dir.path())));

        for app in [follower, local] {
            let response = app.oneshot(get("/wordcount")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_follower_wordcount_reports_count() {
        let store = Arc::new(FollowerStore::new());
        let mut delta = WordCountTable::new();
        delta.insert("hello".to_string(), 5);
        store.apply(&delta).await;

        let app = follower_router(store);

        let response = app
            .clone()
            .oneshot(get("/wordcount?word=hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let table = body_table(response).await;
        assert_eq!(table.get("hello"), Some(&5));

        // Absent words answer zero, not an error.
        let response = app.oneshot(get("/wordcount?word=missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let table = body_table(response).await;
        assert_eq!(table.get("missing"), Some(&0));
    }

    #[tokio::test]
    async fn test_local_update_refreshes_or_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path()));
        let app = local_router(Arc::clone(&store));

        // No snapshot file yet: refresh fails.
        let response = app
            .clone()
            .oneshot(post_json("/update", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let mut table = WordCountTable::new();
        table.insert("a".to_string(), 3);
        crate::store::snapshot::store(dir.path(), &table).await.unwrap();

        let response = app.oneshot(post_json("/update", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(store.count("a").await, 3);
    }
}
