// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded request body reading.
//!
//! A declared `Content-Length` above the limit is rejected before any byte is
//! read. Otherwise the body is consumed chunk by chunk and dropped as soon as
//! the running total passes the limit or the read deadline expires.

use axum::body::Body;
use axum::http::{header, HeaderMap};
use futures::StreamExt;
use toolgate_core::ToolgateError;

use crate::Limits;

/// Reads the whole body within `limits`.
pub async fn read_bounded(
    headers: &HeaderMap,
    body: Body,
    limits: &Limits,
) -> Result<Vec<u8>, ToolgateError> {
    let max = limits.max_body_bytes;

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if declared.is_some_and(|len| len > max as u64) {
        return Err(ToolgateError::PayloadTooLarge { limit: max });
    }

    let read = async {
        let mut stream = body.into_data_stream();
        let mut buf = Vec::with_capacity(declared.map_or(0, |len| len as usize));
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                ToolgateError::InvalidArgument(format!("failed to read request body: {e}"))
            })?;
            if buf.len() + chunk.len() > max {
                return Err(ToolgateError::PayloadTooLarge { limit: max });
            }
            buf.extend_from_slice(&chunk);
        }
        Ok::<_, ToolgateError>(buf)
    };

    tokio::time::timeout(limits.body_read_timeout, read)
        .await
        .map_err(|_| ToolgateError::RequestTimeout {
            duration: limits.body_read_timeout,
        })?
}

/// Reads the body and parses it as JSON.
pub async fn read_json<T: serde::de::DeserializeOwned>(
    headers: &HeaderMap,
    body: Body,
    limits: &Limits,
) -> Result<T, ToolgateError> {
    let bytes = read_bounded(headers, body, limits).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ToolgateError::InvalidArgument(format!("invalid JSON body: {e}")))
}
