//! Response envelope for the asset ingestion protocol.

use serde::Serialize;

use crate::error::AppError;

/// The `{code, message, data?}` envelope used by asset protocol endpoints.
///
/// `code = 0` signals success; any non-zero code carries a caller-facing
/// message. Internal details never travel in the envelope.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T: Serialize> {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(err: &AppError) -> Self {
        Self {
            code: 1,
            message: err.message().to_string(),
            data: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let env = ApiEnvelope::ok(json!({ "id": 3 }));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({ "code": 0, "message": "ok", "data": { "id": 3 } }));
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let err = AppError::bad_request("Invalid name component", json!({}));
        let env = ApiEnvelope::<serde_json::Value>::failure(&err);
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({ "code": 1, "message": "Invalid name component" }));
    }
}
