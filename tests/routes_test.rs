//! Router tests for the course settings service.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health_returns_ok() {
    let app = common::build_test_app(Arc::new(common::lms_with_terms()));

    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_policy_lists_every_platform() {
    let app = common::build_test_app(Arc::new(common::lms_with_terms()));

    let (status, json) = common::get_json(app, "/api/policy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["platforms"]["campus"]["settings_shape"], "permissive");
    assert_eq!(json["platforms"]["online"]["settings_shape"], "conservative");
    assert_eq!(json["platforms"]["pathway"]["course_shape"], "online");
    assert_eq!(json["defaults"]["default_term_id"], 5);
}

#[tokio::test]
async fn test_configure_online_course_writes_three_payloads() {
    let lms = Arc::new(common::lms_with_terms());
    let app = common::build_test_app(lms.clone());

    let (status, json) = common::post_json(
        app,
        "/api/courses/configure",
        &json!({"platform": "online", "course_code": "FDREL 121", "canvas_ou": "4821"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "completed");
    assert_eq!(json["degraded"], false);
    assert_eq!(json["writes"].as_array().unwrap().len(), 3);
    assert_eq!(lms.puts().len(), 3);
}

#[tokio::test]
async fn test_configure_unknown_platform_is_skipped_with_200() {
    let lms = Arc::new(common::lms_with_terms());
    let app = common::build_test_app(lms.clone());

    let (status, json) = common::post_json(
        app,
        "/api/courses/configure",
        &json!({"platform": "residential", "course_code": "X 1", "canvas_ou": "9"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "skipped");
    assert!(json["writes"].as_array().unwrap().is_empty());
    assert!(lms.calls().is_empty());
}

#[tokio::test]
async fn test_configure_reports_failed_write_as_degraded() {
    let lms = Arc::new(common::lms_with_terms().fail("/api/v1/courses/4821/settings"));
    let app = common::build_test_app(lms.clone());

    let (status, json) = common::post_json(
        app,
        "/api/courses/configure",
        &json!({"platform": "campus", "course_code": "CS 124", "canvas_ou": "4821", "term_name": "Fall 2024"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "completed");
    assert_eq!(json["degraded"], true);
    assert_eq!(json["writes"][1]["target"], "settings");
    assert_eq!(json["writes"][1]["ok"], false);
    assert_eq!(json["writes"][2]["ok"], true);
    assert_eq!(lms.puts().len(), 3);
}

#[tokio::test]
async fn test_resolve_previews_campus_payloads_without_writing() {
    let lms = Arc::new(common::lms_with_terms());
    let app = common::build_test_app(lms.clone());

    let (status, json) = common::post_json(
        app,
        "/api/courses/resolve",
        &json!({"platform": "campus", "course_code": "CS 124", "canvas_ou": "4821", "term_name": "Winter 2024"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["payloads"]["course"]["sis_course_id"],
        "Campus.Master.CS 124-InstructorLastName"
    );
    assert_eq!(json["payloads"]["course"]["course_format"], "on_campus");
    // Winter 2024 is absent, so the catalog's Default Term wins
    assert_eq!(json["payloads"]["course"]["term_id"], 1);
    assert_eq!(json["payloads"]["features"], json!({"state": "on"}));
    assert!(lms.puts().is_empty());
}

#[tokio::test]
async fn test_resolve_unknown_platform_returns_422() {
    let app = common::build_test_app(Arc::new(common::lms_with_terms()));

    let (status, json) = common::post_json(
        app,
        "/api/courses/resolve",
        &json!({"platform": "residential", "course_code": "X 1", "canvas_ou": "9"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "platform_not_applicable");
}
