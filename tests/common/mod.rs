//! Shared helpers for router tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use course_settings::policy::PolicyTable;
use course_settings::resolver::Resolver;
use course_settings::step::StepRunner;
use course_settings::testing::RecordingLms;

/// Catalog with one real term and the fallback term, on root account 1.
pub fn lms_with_terms() -> RecordingLms {
    RecordingLms::new().with_terms("1", &[("Fall 2024", 7), ("Default Term", 1)])
}

/// Build the full app against `lms` with the built-in policy table.
pub fn build_test_app(lms: Arc<RecordingLms>) -> Router {
    let runner = StepRunner::new(Resolver::new(PolicyTable::builtin(), "1"), lms);
    course_settings::app(Arc::new(runner))
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
