//! Full application router over stores whose servers never answer.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use bookstore_db::Databases;
use bookstore_kernel::{settings::Settings, ModuleRegistry};
use serde_json::Value;
use tower::ServiceExt;

async fn unreachable_app() -> axum::Router {
    let mut settings = Settings::default();
    settings.database.mysql.url = "mysql://root@127.0.0.1:1/product".to_string();
    settings.database.mysql.max_connections = 1;
    settings.database.mongodb.uri = "mongodb://127.0.0.1:1".to_string();
    settings.database.timeout_ms = 300;
    settings.server.request_timeout_ms = 5000;
    settings.validate().unwrap();

    let db = Databases::connect(settings.database.connect_options())
        .await
        .unwrap();
    let mut registry = ModuleRegistry::new();
    bookstore_app::modules::register_all(&mut registry, &db);
    bookstore_http::build_router(&registry, &settings)
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let response = unreachable_app()
        .await
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn unreachable_document_store_answers_json_server_error() {
    let (status, body) = get_json("/api/books/mongodb").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_relational_store_answers_json_server_error() {
    let (status, body) = get_json("/api/books/mysql").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["message"].as_str().unwrap().is_empty());
}
