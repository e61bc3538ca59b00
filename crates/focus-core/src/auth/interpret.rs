//! Response classification.
//!
//! Pure function of status and body: the same [`RawResponse`] always yields
//! the same [`Outcome`].

use super::spec::StatusTable;
use super::types::{Failure, Outcome, ParsedBody, RawResponse};

/// Decodes the body, then classifies by status.
///
/// Decoding comes first, so a non-JSON body is `MalformedResponse` even on
/// error statuses.
pub fn interpret(raw: &RawResponse, statuses: &StatusTable) -> Outcome {
    let Ok(body) = ParsedBody::decode(&raw.body) else {
        return Outcome::Failure(Failure::malformed(&raw.body));
    };

    if raw.is_success() {
        return Outcome::Success(body);
    }

    Outcome::Failure(Failure::rejected(
        raw.status,
        statuses.message_for(raw.status, &body),
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::spec::{REGISTER, SIGN_IN};
    use crate::auth::types::FailureKind;

    fn sign_in(status: u16, body: &str) -> Outcome {
        interpret(&RawResponse::new(status, body), &SIGN_IN.statuses)
    }

    fn register(status: u16, body: &str) -> Outcome {
        interpret(&RawResponse::new(status, body), &REGISTER.statuses)
    }

    fn rejected(status: u16, message: &str) -> Outcome {
        Outcome::Failure(Failure::rejected(status, message))
    }

    #[test]
    fn test_empty_success_body_is_empty_object() {
        assert_eq!(sign_in(200, ""), Outcome::Success(ParsedBody::empty()));
    }

    #[test]
    fn test_success_carries_decoded_body() {
        let outcome = register(201, r#"{"id":1,"username":"ana"}"#);
        assert_eq!(
            outcome,
            Outcome::Success(ParsedBody::from(json!({"id": 1, "username": "ana"})))
        );
    }

    #[test]
    fn test_non_json_body_is_malformed_with_raw_text() {
        let outcome = sign_in(200, "not-json");
        assert_eq!(
            outcome,
            Outcome::Failure(Failure {
                kind: FailureKind::MalformedResponse,
                message: "Invalid server response: not-json".to_string(),
                status: None,
            })
        );
    }

    #[test]
    fn test_malformed_wins_over_error_status() {
        let outcome = register(500, "<html>Internal Server Error</html>");
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::MalformedResponse);
        assert_eq!(
            failure.message,
            "Invalid server response: <html>Internal Server Error</html>"
        );
    }

    #[test]
    fn test_sign_in_401_ignores_body_message() {
        assert_eq!(
            sign_in(401, r#"{"message":"ignored"}"#),
            rejected(401, "Invalid credentials")
        );
    }

    #[test]
    fn test_sign_in_400_uses_message_then_fallback() {
        assert_eq!(
            sign_in(400, r#"{"message":"Email is required"}"#),
            rejected(400, "Email is required")
        );
        assert_eq!(sign_in(400, ""), rejected(400, "Invalid input"));
        // Sign-in does not consult `error`.
        assert_eq!(
            sign_in(400, r#"{"error":"Bad Request"}"#),
            rejected(400, "Invalid input")
        );
    }

    #[test]
    fn test_register_400_falls_back_to_error_field() {
        assert_eq!(
            register(400, r#"{"error":"Bad Request"}"#),
            rejected(400, "Bad Request")
        );
        assert_eq!(
            register(400, r#"{"message":"Email already exists","error":"Bad Request"}"#),
            rejected(400, "Email already exists")
        );
        assert_eq!(
            register(400, "{}"),
            rejected(400, "Invalid input. Please check your details.")
        );
    }

    #[test]
    fn test_register_409_is_fixed() {
        assert_eq!(
            register(409, r#"{"message":"Username already exists"}"#),
            rejected(409, "Username or email already exists")
        );
    }

    #[test]
    fn test_409_on_sign_in_is_not_special() {
        assert_eq!(
            sign_in(409, r#"{"message":"conflict"}"#),
            rejected(409, "conflict")
        );
        assert_eq!(sign_in(409, ""), rejected(409, "Sign in failed. Please try again"));
    }

    #[test]
    fn test_401_on_register_is_not_special() {
        assert_eq!(register(401, ""), rejected(401, "Please try again"));
    }

    #[test]
    fn test_500_is_fixed_for_both_flows() {
        let body = r#"{"message":"java.lang.RuntimeException: Invalid password"}"#;
        assert_eq!(sign_in(500, body), rejected(500, "Server error. Try later"));
        assert_eq!(
            register(500, body),
            rejected(500, "Server error. Please try again later.")
        );
    }

    #[test]
    fn test_other_status_uses_body_message_or_generic_fallback() {
        assert_eq!(
            register(503, r#"{"error":"Service Unavailable"}"#),
            rejected(503, "Service Unavailable")
        );
        assert_eq!(
            sign_in(404, r#"{"error":"Not Found"}"#),
            rejected(404, "Sign in failed. Please try again")
        );
        assert_eq!(sign_in(302, ""), rejected(302, "Sign in failed. Please try again"));
    }

    #[test]
    fn test_non_object_json_body_is_accepted() {
        assert_eq!(
            register(422, "[1,2,3]"),
            rejected(422, "Please try again")
        );
        assert!(sign_in(200, "\"ok\"").is_success());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let responses = [
            RawResponse::new(200, ""),
            RawResponse::new(400, r#"{"message":"bad"}"#),
            RawResponse::new(500, "oops"),
            RawResponse::new(418, r#"{"error":"teapot"}"#),
        ];
        for raw in &responses {
            for table in [&SIGN_IN.statuses, &REGISTER.statuses] {
                assert_eq!(interpret(raw, table), interpret(raw, table));
            }
        }
    }
}
