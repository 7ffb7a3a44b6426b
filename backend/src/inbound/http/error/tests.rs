//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::validation_failure(vec!["a".into()]), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing"), StatusCode::BAD_REQUEST)]
#[case(Error::credential_mismatch("nope"), StatusCode::BAD_REQUEST)]
#[case(Error::missing_field("absent"), StatusCode::BAD_REQUEST)]
#[case(Error::malformed_token("garbled"), StatusCode::BAD_REQUEST)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> ErrorBody {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error body deserialises")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("pool exhausted at 10.0.0.3").with_trace_id(&expected_trace_id);

    let body = assert_error_response(
        error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(body.mensaje, vec!["Internal server error".to_owned()]);
}

#[rstest]
#[actix_web::test]
async fn validation_messages_are_listed_in_order(expected_trace_id: String) {
    let error = Error::validation_failure(vec![
        "Error en el campo: name, no debe estar vacio".into(),
        "Error en el campo: email, Email invalido".into(),
    ])
    .with_trace_id(&expected_trace_id);

    let body = assert_error_response(
        error,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(
        body.mensaje,
        vec![
            "Error en el campo: name, no debe estar vacio".to_owned(),
            "Error en el campo: email, Email invalido".to_owned(),
        ]
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let body = assert_error_response(
        Error::not_found("Email invalido"),
        StatusCode::BAD_REQUEST,
        None,
    )
    .await;
    assert_eq!(body.mensaje, vec!["Email invalido".to_owned()]);
}

#[rstest]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.messages(), ["Internal server error"]);
    assert_eq!(err.trace_id(), None);
}
