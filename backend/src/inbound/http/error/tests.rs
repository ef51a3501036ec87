//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{FieldErrors, REQUIRED_MESSAGE};
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

async fn render(error: Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, header, body)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("raced"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("pool"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id() {
    let error = Error::internal("diesel said: relation missing")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }));

    let (status, header, body) = render(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], INTERNAL_MESSAGE);
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn outage_messages_are_generic() {
    let (status, _, body) = render(Error::service_unavailable("pool timed out")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
    assert_eq!(body["message"], UNAVAILABLE_MESSAGE);
}

#[rstest]
#[actix_web::test]
async fn validation_errors_list_every_field() {
    let mut fields = FieldErrors::new();
    fields.push("username", "required", REQUIRED_MESSAGE);
    fields.push("password2", "mismatch", "Field must be equal to password.");

    let (status, header, body) = render(Error::from(fields)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(body["code"], "invalid_request");
    let names: Vec<&str> = body["details"]["fields"]
        .as_array()
        .expect("fields array")
        .iter()
        .filter_map(|field| field["field"].as_str())
        .collect();
    assert_eq!(names, vec!["username", "password2"]);
}

#[rstest]
fn error_responses_are_not_cached() {
    let response = ResponseError::error_response(&Error::forbidden("denied"));
    assert_eq!(
        response.headers().get(CACHE_CONTROL),
        Some(&HeaderValue::from_static("no-store"))
    );
}

#[rstest]
fn actix_errors_become_internal() {
    let actix = actix_web::error::ErrorBadGateway("upstream");
    let error = Error::from(actix);
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), INTERNAL_MESSAGE);
}
