use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    CreateAccountParams, CreatedAccount, DomainStatusEntry, InternalUsername, ProviderUsername,
};

/// Raw failure reported inside a provider envelope (internal use).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Envelope status flag, when one was present.
    pub status: Option<String>,
    /// The provider's `statusmsg`.
    pub message: String,
}

impl RawApiError {
    #[cfg(test)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            message: message.into(),
        }
    }
}

/// Maps raw envelope failures onto [`ProviderError`] (internal use).
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier used in error values and log prefixes.
    fn provider_name(&self) -> &'static str;

    /// Classify a raw envelope failure.
    fn map_error(&self, raw: RawApiError) -> ProviderError;

    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn invalid_parameter(&self, param: &str, detail: impl ToString) -> ProviderError {
        ProviderError::InvalidParameter {
            provider: self.provider_name().to_string(),
            param: param.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Reseller hosting API.
///
/// Every call is a single request to an external, asynchronous system. A successful
/// suspend or unsuspend only means the provider accepted the command; the status
/// query reports when it has actually taken effect.
#[async_trait]
pub trait ResellerApi: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &'static str;

    /// Provision a new hosting account (`createacct`).
    ///
    /// Returns the provider-issued username on success. A business rejection
    /// (e.g. domain already hosted) is [`ProviderError::Rejected`].
    async fn create_account(&self, params: &CreateAccountParams) -> Result<CreatedAccount>;

    /// Request suspension (`suspendacct`), addressed by the internal username.
    async fn suspend_account(&self, username: &InternalUsername, reason: &str) -> Result<()>;

    /// Request reactivation (`unsuspendacct`), addressed by the internal username.
    async fn unsuspend_account(&self, username: &InternalUsername) -> Result<()>;

    /// Replace the control-panel password (`passwd`), addressed by the internal username.
    async fn change_password(&self, username: &InternalUsername, new_password: &str)
    -> Result<()>;

    /// Point-in-time status query (`getuserdomains`), addressed by the provider username.
    ///
    /// An empty list means the provider has no visible record yet.
    async fn get_user_domains(&self, username: &ProviderUsername)
    -> Result<Vec<DomainStatusEntry>>;

    /// Whether `domain` can still be provisioned on the provider (`checkavailable`).
    async fn check_available(&self, domain: &str) -> Result<bool>;
}
