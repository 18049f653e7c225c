use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use docrank_core::build::build_from_config;
use docrank_core::IndexConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_index(dir: &Path) -> IndexConfig {
    let corpus = dir.join("corpus");
    fs::create_dir_all(corpus.join("0")).unwrap();
    fs::write(corpus.join("0/0"), "<p>Rust is great. Rust systems programming.</p>").unwrap();
    fs::write(corpus.join("0/1"), "<p>Learning rust.</p>").unwrap();
    fs::write(corpus.join("0/2"), "<p>Cooking pasta.</p>").unwrap();
    fs::write(corpus.join("0/3"), "<p>Garden flowers.</p>").unwrap();
    fs::write(
        corpus.join("bookkeeping.json"),
        r#"{"0/0": "rust-lang.org/about", "0/1": "learn.example/rust", "0/2": "food.example/pasta", "0/3": "garden.example"}"#,
    )
    .unwrap();

    let config = IndexConfig { corpus_dir: corpus, index_path: dir.join("inverted_index"), ..Default::default() };
    build_from_config(&config).unwrap();
    config
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    let config = build_tiny_index(dir.path());
    let app = docrank_server::build_app(&config).unwrap();

    let (status, body) = call(app, "/search?q=rust&k=5").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["query"], "rust");
    assert_eq!(json["total_hits"], 2);
    assert!(json["took_s"].as_f64().unwrap() >= 0.0);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    // higher term frequency in the shorter document wins
    assert_eq!(arr[0]["doc_id"], "0/1");
    assert_eq!(arr[0]["location"], "learn.example/rust");
    assert_eq!(arr[1]["doc_id"], "0/0");
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
}

#[tokio::test]
async fn k_is_clamped_and_stopword_queries_are_empty() {
    let dir = tempdir().unwrap();
    let config = build_tiny_index(dir.path());
    let app = docrank_server::build_app(&config).unwrap();

    let (_, body) = call(app.clone(), "/search?q=rust&k=0").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
    assert_eq!(json["total_hits"], 2);

    let (status, body) = call(app, "/search?q=the%20and%20of").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 0);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stats_and_health() {
    let dir = tempdir().unwrap();
    let config = build_tiny_index(dir.path());
    let app = docrank_server::build_app(&config).unwrap();

    let (status, body) = call(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");

    let (status, body) = call(app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["unique_documents"], 4);
    assert!(json["unique_terms"].as_u64().unwrap() >= 6);
    let size = fs::metadata(&config.index_path).unwrap().len();
    assert_eq!(json["index_size_bytes"], size);
}

#[test]
fn missing_index_fails_to_start() {
    let dir = tempdir().unwrap();
    let config = IndexConfig { index_path: dir.path().join("nope"), ..Default::default() };
    assert!(docrank_server::build_app(&config).is_err());
}
