//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

use crate::types::{DelegationCheck, HostingStatus};

// Re-export library error types
pub use hostpanel_provider::{CredentialValidationError, ProviderError};

/// Core layer error type
///
/// Every variant maps to a stable machine-checkable [`code`](Self::code) that the
/// presentation layer switches on.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// The operation needs an ACTIVE account
    #[error("The hosting account is not active (current status: {0})")]
    NotActive(HostingStatus),

    /// Deactivate on an account that is already suspended
    #[error("The hosting account is already suspended")]
    AlreadySuspended,

    /// Owner exceeded the deactivation rate limit
    #[error("Too many deactivations: at most {limit} within {window_hours} hours")]
    RateLimited { limit: usize, window_hours: i64 },

    /// Reactivation blocked by an administrator suspension
    #[error("This account was suspended by an administrator. Please contact support to reactivate it")]
    AdminSuspended,

    /// A provider action for this account is still awaiting confirmation
    #[error("A previous request for this account is still being processed (status: {0})")]
    TransitionInProgress(HostingStatus),

    /// Transition not permitted by the lifecycle state machine
    #[error("Cannot change account status from {from} to {to}")]
    InvalidTransition { from: HostingStatus, to: HostingStatus },

    /// Domain already used by a non-deleted account
    #[error("The domain {0} is already in use")]
    DomainTaken(String),

    /// Owner already holds the maximum number of accounts
    #[error("Account limit reached: an owner may hold at most {0} hosting accounts")]
    AccountLimitReached(usize),

    /// Malformed domain or subdomain
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// New password does not satisfy the password rules
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Deactivation reason rejected
    #[error("Invalid reason: {0}")]
    InvalidReason(String),

    /// Other input validation failure
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Custom domain does not delegate to the required nameservers
    #[error("{}", .0.message)]
    DelegationFailed(DelegationCheck),

    /// Account missing, or not visible to the caller
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Caller may not perform the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Configuration missing or malformed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The stored row changed between read and write
    #[error("Account {0} was modified concurrently, please retry")]
    ConcurrentModification(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Stable machine-checkable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotActive(_) => "not_active",
            Self::AlreadySuspended => "already_suspended",
            Self::RateLimited { .. } => "rate_limited",
            Self::AdminSuspended => "admin_suspended",
            Self::TransitionInProgress(_) => "transition_in_progress",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::DomainTaken(_) => "domain_taken",
            Self::AccountLimitReached(_) => "account_limit_reached",
            Self::InvalidDomain(_) => "invalid_domain",
            Self::InvalidPassword(_) => "invalid_password",
            Self::InvalidReason(_) => "invalid_reason",
            Self::ValidationError(_) => "validation_error",
            Self::DelegationFailed(_) => "delegation_failed",
            Self::AccountNotFound(_) => "account_not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::StorageError(_) => "storage_error",
            Self::ConfigError(_) => "config_error",
            Self::ConcurrentModification(_) => "concurrent_modification",
            Self::Provider(e) => match e {
                ProviderError::Rejected { .. } => "provider_rejected",
                ProviderError::NetworkError { .. }
                | ProviderError::Timeout { .. }
                | ProviderError::RateLimited { .. } => "provider_unavailable",
                ProviderError::InvalidCredentials { .. }
                | ProviderError::InvalidParameter { .. }
                | ProviderError::ParseError { .. } => "provider_integration",
            },
        }
    }

    /// Whether it is expected behavior (user input, business rule, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NotActive(_)
            | Self::AlreadySuspended
            | Self::RateLimited { .. }
            | Self::AdminSuspended
            | Self::TransitionInProgress(_)
            | Self::InvalidTransition { .. }
            | Self::DomainTaken(_)
            | Self::AccountLimitReached(_)
            | Self::InvalidDomain(_)
            | Self::InvalidPassword(_)
            | Self::InvalidReason(_)
            | Self::ValidationError(_)
            | Self::DelegationFailed(_)
            | Self::AccountNotFound(_)
            | Self::PermissionDenied(_)
            | Self::ConcurrentModification(_) => true,
            Self::Provider(e) => e.is_expected(),
            Self::StorageError(_) | Self::ConfigError(_) => false,
        }
    }

    /// Whether the caller may retry later without changing the request.
    ///
    /// A retryable failure never changed stored state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConcurrentModification(_) => true,
            Self::Provider(e) => e.is_retryable() || matches!(e, ProviderError::ParseError { .. }),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
