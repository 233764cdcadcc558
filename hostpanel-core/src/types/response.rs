//! Owner-facing response envelope

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Error part of an [`ApiResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Machine-checkable code, see [`CoreError::code`].
    pub code: String,
    /// Short user-facing message.
    pub message: String,
    /// Structured payload, e.g. current and required nameservers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub retryable: bool,
}

impl From<&CoreError> for ApiErrorBody {
    fn from(err: &CoreError) -> Self {
        let details = serde_json::to_value(err)
            .ok()
            .and_then(|mut v| v.get_mut("details").map(serde_json::Value::take))
            .filter(|v| !v.is_null());
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
            retryable: err.is_retryable(),
        }
    }
}

/// API response wrapper type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(err: &CoreError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.into()),
        }
    }

    /// Wrap an operation result.
    #[must_use]
    pub fn from_result(result: CoreResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(&e),
        }
    }
}
