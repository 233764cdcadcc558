use serde::{Deserialize, Serialize};

/// Unified error type for all reseller API operations.
///
/// Each variant includes a `provider` field identifying which client produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Error classes
///
/// - Transient: [`NetworkError`](Self::NetworkError), [`Timeout`](Self::Timeout),
///   [`RateLimited`](Self::RateLimited). The outcome of the remote call is unknown;
///   callers keep their previous state and may retry.
/// - Business rejection: [`Rejected`](Self::Rejected). The provider answered with a
///   well-formed envelope carrying a failure status. Its message is surfaced verbatim.
/// - Integration failure: [`ParseError`](Self::ParseError). The response body did not
///   match the documented contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The reseller API credentials were refused (HTTP 401/403).
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The provider processed the request and rejected it (e.g. "account already exists").
    Rejected {
        /// Provider that produced the error.
        provider: String,
        /// The provider's own status message.
        raw_message: String,
    },

    /// A request parameter failed client-side validation before sending.
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },
}

impl ProviderError {
    /// Whether this is expected behavior (user input, business rejection), used for log levels.
    ///
    /// Returns `true` for `warn`-level errors and `false` for `error`-level errors.
    /// **Keep in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::InvalidParameter { .. }
        )
    }

    /// Whether the remote outcome is unknown and the call may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid API credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid API credentials")
                }
            }
            // Shown to end users as-is.
            Self::Rejected { raw_message, .. } => f.write_str(raw_message),
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Unexpected response: {detail}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
