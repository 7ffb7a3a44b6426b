//! Tests for domain error construction and trace correlation.

use super::*;
use rstest::{fixture, rstest};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::credential_mismatch("x"), ErrorCode::CredentialMismatch)]
#[case(Error::missing_field("x"), ErrorCode::MissingField)]
#[case(Error::malformed_token("x"), ErrorCode::MalformedToken)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.messages(), ["x"]);
}

#[rstest]
fn validation_failure_keeps_message_order() {
    let error = Error::validation_failure(vec![
        "Error en el campo: name, no debe estar vacio".to_owned(),
        "Error en el campo: email, Email invalido".to_owned(),
    ]);

    assert_eq!(error.code(), ErrorCode::ValidationFailure);
    assert_eq!(
        error.messages(),
        [
            "Error en el campo: name, no debe estar vacio",
            "Error en el campo: email, Email invalido",
        ]
    );
    assert_eq!(
        error.to_string(),
        "Error en el campo: name, no debe estar vacio; Error en el campo: email, Email invalido"
    );
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn with_trace_id_overrides_value(expected_trace_id: String) {
    let error = Error::not_found("missing").with_trace_id(expected_trace_id.clone());
    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}
