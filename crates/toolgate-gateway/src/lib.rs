// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway exposing the tool registry.
//!
//! Routes:
//! - `GET /healthz`
//! - `GET /tools`
//! - `POST /call-tool` (and `OPTIONS` for CORS preflight)
//! - `POST /v1/chat/completions`, `GET /v1/models` (OpenAI-compatible proxy)
//!
//! Every request body is read under a byte limit and a deadline, and every
//! tool call runs under an execution deadline.

pub mod body;
pub mod chat;
pub mod error;
pub mod handlers;
pub mod server;

use std::time::Duration;

pub use chat::{ChatConfig, ChatProxy};
pub use error::{ApiError, ErrorResponse};
pub use server::{build_router, start_server, GatewayState, ServerConfig};

/// Resource bounds applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
    /// Deadline for receiving the complete request body.
    pub body_read_timeout: Duration,
    /// Deadline for a single tool execution.
    pub tool_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_body_bytes: 1_000_000,
            body_read_timeout: Duration::from_millis(5_000),
            tool_timeout: Duration::from_millis(30_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_body_bytes, 1_000_000);
        assert_eq!(limits.body_read_timeout, Duration::from_secs(5));
        assert_eq!(limits.tool_timeout, Duration::from_secs(30));
    }
}
