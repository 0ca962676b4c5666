//! Uniform response envelope returned by every query operation.

use serde::{Deserialize, Serialize};

/// Message used when a lookup by id finds nothing.
pub const INVOICE_NOT_FOUND: &str = "Invoice not found";

/// `{ data, success, message? }` wrapper.
///
/// Domain failures (record not found) are carried here with
/// `success = false`; they are never raised as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response without a message.
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            message: None,
        }
    }

    /// Failed response carrying a human-readable message.
    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            success: false,
            message: Some(message.into()),
        }
    }
}

impl<T> ApiResponse<Option<T>> {
    /// Wraps an optional lookup: `None` becomes a not-found failure.
    pub fn found_or(data: Option<T>, not_found_message: &str) -> Self {
        match data {
            Some(value) => Self::ok(Some(value)),
            None => Self::failure(None, not_found_message),
        }
    }
}
