//! The `{status, message, <resource key>}` wrapper every API response uses.

use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Response envelope. The resource payload is flattened next to `status` so a
/// body struct like `CompaniesBody { companies }` serializes as
/// `{"status": "success", "companies": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl Envelope<ErrorDetail> {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: Some(message.into()),
            data: ErrorDetail { code: code.into() },
        }
    }
}

/// Payload for responses that carry nothing besides status and message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Things {
        things: Vec<u32>,
    }

    #[test]
    fn test_payload_is_flattened_next_to_status() {
        let value = serde_json::to_value(Envelope::success(Things { things: vec![1, 2] })).unwrap();
        assert_eq!(value, json!({"status": "success", "things": [1, 2]}));
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = serde_json::to_value(Envelope::error("NOT_FOUND", "Company 4 not found")).unwrap();
        assert_eq!(
            value,
            json!({"status": "error", "message": "Company 4 not found", "code": "NOT_FOUND"})
        );
    }

    #[test]
    fn test_empty_payload_has_only_status_and_message() {
        let value = serde_json::to_value(Envelope::success(Empty {}).with_message("done")).unwrap();
        assert_eq!(value, json!({"status": "success", "message": "done"}));
    }
}
