//! JSON envelope shared by every API response.
//!
//! ```json
//! {
//!   "timestamp": "2024-06-15T12:00:00Z",
//!   "success": false,
//!   "code": "CUSTOMER_NOT_FOUND",
//!   "message": "Customer not found.",
//!   "data": null
//! }
//! ```
//!
//! `code` is `null` on success; `data` is omitted when there is nothing to return.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Message attached to every successful response.
pub const SUCCESS_MESSAGE: &str = "Operation completed successfully.";

/// Response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub code: Option<&'static str>,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `data`.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            timestamp: Utc::now(),
            success: true,
            code: None,
            message: SUCCESS_MESSAGE,
            data: Some(data),
        }
    }

    /// Error response with a stable code and optional detail.
    #[must_use]
    pub fn error(code: &'static str, message: &'static str, data: Option<T>) -> Self {
        Self {
            timestamp: Utc::now(),
            success: false,
            code: Some(code),
            message,
            data,
        }
    }

    /// Pair the envelope with a status code.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(serde_json::json!({"handle": "op"})))
            .unwrap();
        assert_eq!(json["success"], true);
        assert!(json["code"].is_null());
        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["data"]["handle"], "op");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_error_envelope_omits_missing_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(
            "CUSTOMER_NOT_FOUND",
            "Customer not found.",
            None,
        ))
        .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "CUSTOMER_NOT_FOUND");
        assert!(json.get("data").is_none());
    }
}
