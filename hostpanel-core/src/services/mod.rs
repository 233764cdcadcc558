//! Business logic service layer

mod hosting_service;
mod locks;
mod nameserver_service;
mod rate_limiter;
mod reconciliation;
pub mod validation;

pub use hosting_service::HostingService;
pub use locks::AccountLockRegistry;
pub use nameserver_service::NameserverVerificationService;
pub use rate_limiter::RateLimiter;
pub use reconciliation::reconcile;

use std::sync::Arc;

use tokio::sync::RwLock;

use hostpanel_dns::DnsResolver;
use hostpanel_provider::{ProviderError, ResellerApi};

use crate::config::ConfigService;
use crate::error::CoreError;
use crate::traits::{HostingAccountRepository, Notifier};
use crate::types::{HostingAccount, HostingStatus};

/// Service context - holds all dependencies
///
/// The platform layer creates this context and injects its storage and
/// network implementations.
pub struct ServiceContext {
    /// Hosting account store
    pub account_repository: Arc<dyn HostingAccountRepository>,
    /// DNS resolver adapter
    pub dns_resolver: Arc<dyn DnsResolver>,
    /// Owner notifications
    pub notifier: Arc<dyn Notifier>,
    /// Operator configuration
    pub config: Arc<ConfigService>,
    /// Per-account and per-owner exclusive access
    pub locks: AccountLockRegistry,
    reseller: RwLock<Arc<dyn ResellerApi>>,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        account_repository: Arc<dyn HostingAccountRepository>,
        reseller: Arc<dyn ResellerApi>,
        dns_resolver: Arc<dyn DnsResolver>,
        notifier: Arc<dyn Notifier>,
        config: Arc<ConfigService>,
    ) -> Self {
        Self {
            account_repository,
            dns_resolver,
            notifier,
            config,
            locks: AccountLockRegistry::new(),
            reseller: RwLock::new(reseller),
        }
    }

    /// Current reseller API client.
    pub async fn reseller(&self) -> Arc<dyn ResellerApi> {
        self.reseller.read().await.clone()
    }

    /// Swap the reseller client, e.g. after credentials changed on reload.
    ///
    /// Calls already holding the old client finish with it.
    pub async fn replace_reseller(&self, reseller: Arc<dyn ResellerApi>) {
        *self.reseller.write().await = reseller;
    }

    /// Convert a provider failure, flagging rejected reseller credentials loudly.
    pub fn handle_provider_error(&self, action: &str, err: ProviderError) -> CoreError {
        match &err {
            ProviderError::InvalidCredentials { provider, .. } => log::error!(
                "[{provider}] {action}: reseller API credentials were refused, check reseller.api_username/api_password"
            ),
            ProviderError::ParseError { provider, detail } => {
                log::error!("[{provider}] {action}: unexpected response body: {detail}");
            }
            _ => log::warn!("{action} failed: {err}"),
        }
        CoreError::Provider(err)
    }

    /// Tell the owner about a status change. Failures are logged only.
    pub async fn notify_status_changed(&self, account: &HostingAccount, from: HostingStatus) {
        if let Err(e) = self.notifier.status_changed(account, from).await {
            log::warn!(
                "Failed to notify owner of {} about {from} -> {}: {e}",
                account.id,
                account.status
            );
        }
    }

    /// Tell the owner about a new account. Failures are logged only.
    pub async fn notify_created(&self, account: &HostingAccount) {
        if let Err(e) = self.notifier.account_created(account).await {
            log::warn!("Failed to notify owner of new account {}: {e}", account.id);
        }
    }
}

/// Log an operation failure at the level its class calls for.
fn log_failure(operation: &str, account_id: &str, err: &CoreError) {
    if err.is_expected() {
        log::warn!("{operation} {account_id} rejected: {err}");
    } else {
        log::error!("{operation} {account_id} failed: {err}");
    }
}
