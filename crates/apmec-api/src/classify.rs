//! Maps an HTTP status code plus a deserialized error body onto a
//! classified [`ApiError`].
//!
//! Lookup order: exact domain `type` match, then the per-status default
//! table, then a generic error carrying whatever message was found.

use crate::errors::{ApiError, ErrorKind};
use log::debug;
use serde_json::Value;

/// Wire key the service uses for its domain error envelope.
pub const DOMAIN_ERROR_KEY: &str = "ApmecError";

/// Explicit mapping from the domain error `type` field to an error kind.
///
/// Replaces dynamic exception-name lookup: every recognized type is
/// listed here, anything else falls through to the status-code table.
fn kind_for_type(error_type: &str) -> Option<ErrorKind> {
    let kind = match error_type {
        "BadRequest" | "InvalidInput" | "StateInvalid" => ErrorKind::BadRequest,
        "Unauthorized" => ErrorKind::Unauthorized,
        "Forbidden" | "NotAuthorized" => ErrorKind::Forbidden,
        "NotFound" | "MeaNotFound" | "MeadNotFound" | "VimNotFound" | "MesNotFound"
        | "MesdNotFound" | "MecaNotFound" | "MecadNotFound" | "EventNotFound" => {
            ErrorKind::NotFound
        }
        "Conflict" | "InUse" | "MeaInUse" | "MeadInUse" | "MesdInUse" | "MecadInUse"
        | "VimInUse" => ErrorKind::Conflict,
        "ServiceUnavailable" => ErrorKind::ServiceUnavailable,
        "InternalServerError" => ErrorKind::InternalServerError,
        _ => return None,
    };
    Some(kind)
}

/// Default kind for a status code when the domain type is unrecognized.
fn kind_for_status(status_code: u16) -> Option<ErrorKind> {
    match status_code {
        400 => Some(ErrorKind::BadRequest),
        401 => Some(ErrorKind::Unauthorized),
        403 => Some(ErrorKind::Forbidden),
        404 => Some(ErrorKind::NotFound),
        409 => Some(ErrorKind::Conflict),
        503 => Some(ErrorKind::ServiceUnavailable),
        500..=599 => Some(ErrorKind::InternalServerError),
        _ => None,
    }
}

/// Classify a non-success response body into exactly one error.
///
/// `body` is the deserialized error content; callers that fail to
/// deserialize the raw body wrap it as `{"message": <raw>}` first.
pub fn classify_fault(status_code: u16, body: &Value) -> ApiError {
    debug!("Classifying fault: status={} body={}", status_code, body);

    if let Some(error_dict) = body.get(DOMAIN_ERROR_KEY) {
        let error_type = error_dict.get("type").and_then(Value::as_str);
        let error_message = error_dict.get("message").and_then(Value::as_str);
        match (error_type, error_message) {
            (Some(error_type), Some(message)) => {
                let mut message = message.to_string();
                if let Some(detail) = error_dict.get("detail").and_then(Value::as_str) {
                    if !detail.is_empty() {
                        message.push('\n');
                        message.push_str(detail);
                    }
                }
                return match kind_for_type(error_type).or_else(|| kind_for_status(status_code)) {
                    Some(kind) => ApiError::Api {
                        status_code,
                        kind,
                        message,
                    },
                    None => ApiError::Generic {
                        status_code,
                        message,
                    },
                };
            }
            _ => {
                // Domain key present but not in the expected shape.
                return ApiError::Generic {
                    status_code,
                    message: error_dict.to_string(),
                };
            }
        }
    }

    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return ApiError::Generic {
            status_code,
            message: message.to_string(),
        };
    }

    // Not a domain error at all.
    let body_text = match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    ApiError::Generic {
        status_code,
        message: format!("{}-{}", status_code, body_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognized_domain_type_is_classified() {
        let body = json!({
            "ApmecError": {"type": "MeaNotFound", "message": "MEA x not found"}
        });
        match classify_fault(404, &body) {
            ApiError::Api {
                status_code,
                kind,
                message,
            } => {
                assert_eq!(status_code, 404);
                assert_eq!(kind, ErrorKind::NotFound);
                assert_eq!(message, "MEA x not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn detail_is_appended_on_its_own_line() {
        let body = json!({
            "ApmecError": {
                "type": "MeadInUse",
                "message": "MEAD d in use",
                "detail": "delete dependent MEAs first"
            }
        });
        match classify_fault(409, &body) {
            ApiError::Api { kind, message, .. } => {
                assert_eq!(kind, ErrorKind::Conflict);
                assert_eq!(message, "MEAD d in use\ndelete dependent MEAs first");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_falls_back_to_status_table() {
        let body = json!({
            "ApmecError": {"type": "SomethingNew", "message": "boom"}
        });
        match classify_fault(409, &body) {
            ApiError::Api { kind, .. } => assert_eq!(kind, ErrorKind::Conflict),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_and_status_yields_generic() {
        let body = json!({
            "ApmecError": {"type": "SomethingNew", "message": "boom"}
        });
        match classify_fault(418, &body) {
            ApiError::Generic {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 418);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn malformed_domain_envelope_is_generic() {
        let body = json!({"ApmecError": {"type": "NotFound"}});
        assert!(matches!(
            classify_fault(404, &body),
            ApiError::Generic { status_code: 404, .. }
        ));
    }

    #[test]
    fn plain_message_key_is_generic() {
        let body = json!({"message": "quota exceeded"});
        match classify_fault(409, &body) {
            ApiError::Generic { message, .. } => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_mapping_body_formats_status_and_body() {
        match classify_fault(500, &json!("internal error")) {
            ApiError::Generic {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "500-internal error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn five_xx_defaults_to_internal_server_error() {
        let body = json!({
            "ApmecError": {"type": "Mystery", "message": "nope"}
        });
        match classify_fault(502, &body) {
            ApiError::Api { kind, .. } => assert_eq!(kind, ErrorKind::InternalServerError),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
