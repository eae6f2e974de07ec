use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use ftsearch_server::{build_app, AppConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "secret";

fn app() -> Router {
    build_app(AppConfig { admin_token: Some(TOKEN.into()), ignore: vec!["url".into()], ..AppConfig::default() })
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body: Bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri).header("X-ADMIN-TOKEN", TOKEN);
    match body {
        Some(body) => builder.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn seeded() -> Router {
    let app = app();
    let docs = json!([
        {"id": 0, "title": "Rust in Action", "body": "Rust systems programming", "url": "mirror"},
        {"id": 1, "title": "Learning Go", "body": "Go and a little rust", "url": "mirror"},
        {"id": 2, "title": "Cooking", "body": "Football snacks", "url": "mirror"},
    ]);
    let (status, json) = call(&app, admin("POST", "/index/batch", Some(docs))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["indexed"], 3);
    app
}

#[tokio::test]
async fn health_is_ok() {
    let resp = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let app = seeded().await;
    let (status, json) = call(&app, get("/search?q=rust&k=10")).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert!(json["total_hits"].as_u64().unwrap() >= 2);
    let ids: Vec<u64> = results.iter().map(|r| r["document_id"].as_u64().unwrap()).collect();
    assert!(ids.contains(&0) && ids.contains(&1));
    assert!(results.windows(2).all(|w| w[0]["score"].as_f64() >= w[1]["score"].as_f64()));
}

#[tokio::test]
async fn search_respects_fields_and_k() {
    let app = seeded().await;
    let (_, json) = call(&app, get("/search?q=rust&fields=title")).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["document_id"], 0);

    let (_, json) = call(&app, get("/search?q=rust&k=1")).await;
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn autocomplete_suggests_indexed_tokens() {
    let app = seeded().await;
    let (status, json) = call(&app, get("/autocomplete?q=foo")).await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = json["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0]["suggestion"].as_str().unwrap().starts_with("foot"));
}

#[tokio::test]
async fn ignored_fields_are_not_searchable() {
    let app = seeded().await;
    let (_, json) = call(&app, get("/search?q=mirror")).await;
    assert_eq!(json["total_hits"], 0);
}

#[tokio::test]
async fn duplicates_and_bad_documents_are_reported() {
    let app = seeded().await;
    let batch = json!([{"id": 0, "title": "again"}, {"title": "no id"}, {"id": 7, "title": "new"}]);
    let (status, json) = call(&app, admin("POST", "/index/batch", Some(batch))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["indexed"], 1);
    assert_eq!(json["duplicates"], 1);
    assert_eq!(json["errors"][0]["position"], 1);

    let (_, stats) = call(&app, get("/stats")).await;
    assert_eq!(stats["size"], 4);
}

#[tokio::test]
async fn mutations_require_admin_token() {
    let app = seeded().await;
    let req = Request::post("/index/clear").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::post("/index/clear").header("X-ADMIN-TOKEN", "guess").body(Body::empty()).unwrap();
    assert_eq!(app.clone().oneshot(wrong).await.unwrap().status(), StatusCode::UNAUTHORIZED);

    let open = build_app(AppConfig::default());
    let req = Request::post("/index/clear").body(Body::empty()).unwrap();
    assert_eq!(open.oneshot(req).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_and_clear_update_stats() {
    let app = seeded().await;
    let (status, json) = call(&app, admin("DELETE", "/doc/2", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);
    let (_, json) = call(&app, admin("DELETE", "/doc/2", None)).await;
    assert_eq!(json["removed"], false);

    let (_, json) = call(&app, get("/autocomplete?q=foo")).await;
    assert!(json["suggestions"].as_array().unwrap().is_empty());

    call(&app, admin("POST", "/index/clear", None)).await;
    let (_, stats) = call(&app, get("/stats")).await;
    assert_eq!(stats, json!({"size": 0, "token_count": 0}));
}

#[tokio::test]
async fn long_tokens_survive_indexing_and_clear() {
    let app = app();
    let doc = json!({"id": 11, "body": "z".repeat(50_000)});
    let (status, json) = call(&app, admin("POST", "/index/batch", Some(doc))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["indexed"], 1);

    let (status, _) = call(&app, admin("POST", "/index/clear", None)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, stats) = call(&app, get("/stats")).await;
    assert_eq!(stats, json!({"size": 0, "token_count": 0}));
}
