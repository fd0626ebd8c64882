//! Tests for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::unauthenticated("login required"), ErrorCode::Unauthenticated)]
#[case(Error::subject_not_found("gone"), ErrorCode::SubjectNotFound)]
#[case(Error::permission_denied("no"), ErrorCode::PermissionDenied)]
#[case(Error::invalid_argument("bad"), ErrorCode::InvalidArgument)]
#[case(Error::already_exists("dup"), ErrorCode::AlreadyExists)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::internal("boom"), ErrorCode::Internal)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn serialises_camel_case_without_empty_fields() {
    let err = Error::already_exists("email already registered");
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(
        value,
        json!({ "code": "already_exists", "message": "email already registered" })
    );
}

#[rstest]
fn serialises_trace_id_and_details_when_present() {
    let err = Error::invalid_argument("bad")
        .with_trace_id("abc")
        .with_details(json!({ "field": "name" }));
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(value["traceId"], "abc");
    assert_eq!(value["details"]["field"], "name");
}

#[rstest]
fn code_wire_names_match_serde() {
    for code in [
        ErrorCode::Unauthenticated,
        ErrorCode::SubjectNotFound,
        ErrorCode::PermissionDenied,
        ErrorCode::InvalidArgument,
        ErrorCode::AlreadyExists,
        ErrorCode::NotFound,
        ErrorCode::Internal,
    ] {
        let json = serde_json::to_value(code).expect("serialise code");
        assert_eq!(json, json!(code.as_str()));
    }
}

#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id = TraceId::generate();
    let err = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
    assert_eq!(err.trace_id(), Some(trace_id.to_string().as_str()));
}

#[rstest]
fn display_includes_code_and_message() {
    assert_eq!(
        Error::not_found("user 3 not found").to_string(),
        "not_found: user 3 not found"
    );
}
