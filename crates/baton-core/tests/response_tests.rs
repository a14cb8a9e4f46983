use baton_core::auth::TokenError;
use baton_core::prelude::*;
use serde_json::Map;

fn map(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_success_envelope_shape() {
    let r = Responses::success(map(json!({"id": 1})));
    assert_eq!(
        serde_json::to_value(&r).unwrap(),
        json!({
            "http_code": 200,
            "error": 0,
            "status": "success",
            "status_code": 0,
            "payload": {"id": 1}
        })
    );
}

#[test]
fn test_error_kinds() {
    let cases = [
        (Responses::bad_request(Map::new()), 400, "bad_request", "request"),
        (Responses::missing_parameters(Map::new()), 400, "missing_parameters", "request"),
        (Responses::failed_validation(Map::new()), 400, "failed_validation", "request"),
        (Responses::failed_authentication(Map::new()), 401, "failed_authentication", "access"),
        (Responses::not_authenticated(Map::new()), 401, "not_authenticated", "access"),
        (Responses::forbidden(Map::new()), 403, "forbidden", "access"),
        (Responses::not_found(Map::new()), 404, "not_found", "access"),
        (Responses::data_not_found(Map::new()), 404, "data_not_found", "not_found"),
        (Responses::internal_error(Map::new()), 500, "internal_error", "internal"),
        (Responses::invalid_method_parameters(Map::new()), 500, "invalid_method_parameters", "internal"),
    ];
    for (r, code, status, kind) in cases {
        assert_eq!(r.http_code, code, "{status}");
        assert_eq!(r.status, status);
        assert_eq!(r.error, 1);
        assert_eq!(r.error_type.as_deref(), Some(kind));
    }
}

#[test]
fn test_bad_request_keeps_custom_status() {
    let r = Responses::bad_request(map(json!({"status": "duplicate_email", "status_code": 12})));
    assert_eq!(r.status, "duplicate_email");
    assert_eq!(r.status_code, 12);
    assert!(r.payload.is_empty());
}

#[test]
fn test_redirects() {
    let r = Responses::see_other(map(json!({"uri": "/login"})));
    assert_eq!(r.http_code, 303);
    assert_eq!(r.status, "see_other");
    assert_eq!(r.payload.get("uri"), Some(&json!("/login")));

    let r = Responses::moved_permanently(Map::new());
    assert_eq!(r.http_code, 301);
    assert_eq!(r.payload.get("uri"), Some(&json!("/")));
}

#[test]
fn test_no_data() {
    let r = Responses::no_data(Map::new());
    assert_eq!(r.http_code, 200);
    assert_eq!(r.error, 0);
    assert_eq!(r.status, "no_data");
}

#[test]
fn test_envelope_round_trips_through_value() {
    let r = Responses::not_authenticated(map(json!({"message": "Expired token"})));
    let back = ApiResponse::from_value(&r.clone().into_value()).unwrap();
    assert_eq!(back, r);

    assert!(ApiResponse::from_value(&json!({"status": "x"})).is_none());
    assert!(ApiResponse::from_value(&json!("plain")).is_none());
}

#[test]
fn test_to_json() {
    let body = Responses::success(Map::new()).to_json();
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["status"], json!("success"));
    assert!(parsed.get("error_type").is_none());
}

#[test]
fn test_error_status_codes() {
    assert_eq!(BatonError::DuplicateRouteName("x".into()).status_code(), 500);
    assert_eq!(BatonError::InvalidRoute("x".into()).status_code(), 500);
    assert_eq!(BatonError::InvalidHandler("x".into()).status_code(), 500);
    assert_eq!(BatonError::Token(TokenError::Expired).status_code(), 401);
    assert_eq!(BatonError::NotFound("x".into()).status_code(), 404);

    let veto = BatonError::FilterShortCircuit {
        phase: Phase::Before,
        value: json!("nope"),
    };
    assert_eq!(veto.status_code(), 403);
    assert_eq!(veto.error_code(), "FILTER_REJECTED");
    assert_eq!(veto.veto_value(), Some(&json!("nope")));
    assert_eq!(veto.to_string(), "before filter rejected the request");

    let veto = BatonError::FilterShortCircuit {
        phase: Phase::After,
        value: Responses::failed_validation(Map::new()).into_value(),
    };
    assert_eq!(veto.status_code(), 400);
}

#[test]
fn test_error_into_response() {
    let r = BatonError::Token(TokenError::Expired).into_response();
    assert_eq!(r.http_code, 401);
    assert_eq!(r.payload.get("message"), Some(&json!("Expired token")));

    let r = BatonError::NotFound("widget 9".into()).into_response();
    assert_eq!(r.http_code, 404);
    assert_eq!(r.status, "data_not_found");

    let r = BatonError::InvalidHandler("Invalid route method A@b".into()).into_response();
    assert_eq!(r.http_code, 500);
    assert_eq!(r.payload.get("code"), Some(&json!("INVALID_HANDLER")));
}

#[test]
fn test_token_error_converts() {
    let err: BatonError = TokenError::MissingToken.into();
    assert!(matches!(err, BatonError::Token(TokenError::MissingToken)));
}
