//! DNS error type

use serde::Serialize;
use thiserror::Error;

/// Outcome of a failed DNS lookup.
///
/// Every variant is a data point for the caller rather than a reason to abort:
/// a `Refused` from the recursive resolver is what an undelegated subdomain
/// looks like, and is what drives the parent delegation fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum DnsError {
    /// NXDOMAIN, or NOERROR with no records of the requested type.
    #[error("No records found for {0}")]
    NotFound(String),

    /// The server answered REFUSED.
    #[error("Query refused for {0}")]
    Refused(String),

    /// No answer within the per-attempt timeout.
    #[error("DNS timeout: {0}")]
    Timeout(String),

    /// Transport failure, SERVFAIL or a malformed response.
    #[error("DNS network error: {0}")]
    Network(String),

    /// The name is not a valid domain.
    #[error("Invalid domain name: {0}")]
    InvalidName(String),
}

impl DnsError {
    /// Whether another attempt could produce a different answer.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }
}

/// Result alias for DNS operations.
pub type DnsResult<T> = std::result::Result<T, DnsError>;
