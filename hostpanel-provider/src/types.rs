//! Core types for the reseller API abstraction.
//!
//! The provider addresses one hosting account by two different names. The short
//! login name chosen when the account is created ([`InternalUsername`]) drives
//! `createacct`, `suspendacct`, `unsuspendacct` and `passwd`, while the 8-character
//! name the provider assigns in return ([`ProviderUsername`]) drives the status
//! query. Passing the wrong one is accepted by the provider and silently does
//! nothing, so both are kept as distinct types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============ Identifiers ============

/// Short login username chosen at creation time.
///
/// Used by the create, suspend, unsuspend and password-change endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalUsername(String);

impl InternalUsername {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Username assigned by the provider on account creation (`vpusername`).
///
/// Used only by the domain-status query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderUsername(String);

impl ProviderUsername {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============ Status Query ============

/// Account status as reported by the provider's domain-status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderStatus {
    /// Provider reports `ACTIVE`.
    Active,
    /// Provider reports `SUSPENDED`.
    Suspended,
    /// Any other status string (e.g. `PENDING`, `REACTIVATING`), kept verbatim.
    Other(String),
}

impl ProviderStatus {
    /// Parse a provider status string, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("active") {
            Self::Active
        } else if trimmed.eq_ignore_ascii_case("suspended") {
            Self::Suspended
        } else {
            Self::Other(trimmed.to_string())
        }
    }
}

/// One `(status, domain)` tuple from the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatusEntry {
    pub status: ProviderStatus,
    pub domain: String,
}

// ============ Account Creation ============

/// Parameters for the `createacct` endpoint.
#[derive(Clone)]
pub struct CreateAccountParams {
    /// Sent as `username`.
    pub username: InternalUsername,
    /// Sent as `password`. Alphanumeric only.
    pub password: String,
    /// Sent as `contactemail`.
    pub contact_email: String,
    /// Sent as `domain`.
    pub domain: String,
    /// Sent as `plan`.
    pub plan: String,
}

impl fmt::Debug for CreateAccountParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccountParams")
            .field("username", &self.username)
            .field("password", &"***")
            .field("contact_email", &self.contact_email)
            .field("domain", &self.domain)
            .field("plan", &self.plan)
            .finish()
    }
}

/// Result of a successful `createacct` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAccount {
    /// The provider-issued username (`options.vpusername`).
    pub provider_username: ProviderUsername,
    /// The provider's `statusmsg`, which may be empty.
    pub message: String,
}

// ============ Credentials ============

/// Validation error for reseller credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required field is missing entirely.
    MissingField { field: String },
    /// A field is present but empty or whitespace-only.
    EmptyField { field: String },
    /// A field has an invalid format.
    InvalidFormat { field: String, reason: String },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "Missing required field: {field}"),
            Self::EmptyField { field } => write!(f, "Field must not be empty: {field}"),
            Self::InvalidFormat { field, reason } => write!(f, "{field}: {reason}"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Reseller API account credentials.
///
/// `api_username`/`api_password` are sent as the HTTP Basic auth pair on every
/// call, and again as `api_user`/`api_key` in the body of status queries.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResellerCredentials {
    /// Base URL, e.g. `https://panel.myownfreehost.net:2087`.
    pub api_url: String,
    pub api_username: String,
    pub api_password: String,
}

impl fmt::Debug for ResellerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResellerCredentials")
            .field("api_url", &self.api_url)
            .field("api_username", &self.api_username)
            .field("api_password", &"***")
            .finish()
    }
}

impl ResellerCredentials {
    /// Build credentials from a flat key-value map (`api_url`, `api_username`, `api_password`).
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError`] when a field is missing or empty, or
    /// when `api_url` is not an `http(s)` URL.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, CredentialValidationError> {
        let creds = Self {
            api_url: Self::get_required_field(map, "api_url")?,
            api_username: Self::get_required_field(map, "api_username")?,
            api_password: Self::get_required_field(map, "api_password")?,
        };
        creds.validate()?;
        Ok(creds)
    }

    /// Check that every field is populated and the URL has an HTTP scheme.
    ///
    /// # Errors
    ///
    /// Returns the first [`CredentialValidationError`] found.
    pub fn validate(&self) -> Result<(), CredentialValidationError> {
        for (field, value) in [
            ("api_url", &self.api_url),
            ("api_username", &self.api_username),
            ("api_password", &self.api_password),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialValidationError::EmptyField {
                    field: field.to_string(),
                });
            }
        }
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(CredentialValidationError::InvalidFormat {
                field: "api_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    fn get_required_field(
        map: &HashMap<String, String>,
        key: &str,
    ) -> Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                field: key.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                field: key.to_string(),
            }),
            Some(v) => Ok(v.trim().to_string()),
        }
    }
}
