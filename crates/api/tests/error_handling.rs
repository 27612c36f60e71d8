//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! involved.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use novagen_api::error::AppError;
use novagen_archive::ArchiveError;
use novagen_client::api::ImagineApiError;
use novagen_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Generation",
        id: "abc123".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Generation with id abc123 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("No prompt provided".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "No prompt provided");
}

#[tokio::test]
async fn missing_credential_explains_itself() {
    let (status, json) = error_to_response(ImagineApiError::NotConfigured.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("IMAGINEPRO_API_KEY"));
}

#[tokio::test]
async fn upstream_status_error_is_sanitized() {
    let err = ImagineApiError::ApiError {
        status: 402,
        body: "{\"message\":\"insufficient credits for user 77\"}".into(),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("user 77"));
}

#[tokio::test]
async fn missing_job_id_names_the_operation() {
    let err = ImagineApiError::MissingJobId { operation: "button" };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(json["error"].as_str().unwrap().contains("button"));
}

#[tokio::test]
async fn archive_errors_map_by_kind() {
    let (status, json) =
        error_to_response(ArchiveError::InvalidKey("../etc".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/output denied");
    let (status, json) = error_to_response(ArchiveError::Io(io).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn unusable_base_url_is_a_configuration_error() {
    let err = ImagineApiError::InvalidBaseUrl("not a url".into());

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
}

#[test]
fn core_errors_convert_transparently() {
    let err: AppError = CoreError::Configuration("bad".into()).into();
    assert_matches!(err, AppError::Core(CoreError::Configuration(_)));
}
