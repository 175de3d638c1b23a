// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of errors to JSON HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use toolgate_core::ToolgateError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
    /// Machine-readable error kind.
    pub code: String,
}

/// A request-level failure, rendered as `{"error", "code"}` with a status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// The chat proxy was called but no upstream is configured.
    pub fn upstream_not_configured() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "upstream_unavailable",
            message: "no upstream chat provider is configured".to_string(),
        }
    }
}

/// HTTP status for an error kind.
pub fn status_for(err: &ToolgateError) -> StatusCode {
    match err {
        ToolgateError::ToolNotFound { .. } => StatusCode::NOT_FOUND,
        ToolgateError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        ToolgateError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ToolgateError::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
        ToolgateError::ToolTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ToolgateError::PluginUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ToolgateError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        ToolgateError::Plugin { .. }
        | ToolgateError::Internal(_)
        | ToolgateError::Config(_)
        | ToolgateError::Manifest(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ToolgateError> for ApiError {
    fn from(err: ToolgateError) -> Self {
        Self {
            status: status_for(&err),
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_mapping() {
        let cases = [
            (ToolgateError::ToolNotFound { name: "x".into() }, 404),
            (ToolgateError::InvalidArgument("x".into()), 400),
            (ToolgateError::PayloadTooLarge { limit: 1 }, 413),
            (ToolgateError::RequestTimeout { duration: Duration::from_secs(1) }, 408),
            (
                ToolgateError::ToolTimeout {
                    name: "x".into(),
                    duration: Duration::from_secs(1),
                },
                504,
            ),
            (ToolgateError::PluginUnavailable { plugin_id: "p".into() }, 503),
            (ToolgateError::Upstream { message: "x".into(), source: None }, 502),
            (ToolgateError::plugin("p", "boom"), 500),
            (ToolgateError::Internal("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err).as_u16(), status, "{err}");
        }
    }

    #[test]
    fn api_error_keeps_message_and_code() {
        let api: ApiError = ToolgateError::plugin("p", "disk full").into();
        assert_eq!(api.code, "plugin_error");
        assert!(api.message.contains("disk full"));
    }
}
