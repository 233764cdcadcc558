//! Owner notification hook

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{HostingAccount, HostingStatus};

/// Side notifications to the account owner (mail, webhooks, ...).
///
/// Delivery is best effort: the hosting service logs a failure and carries on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn account_created(&self, account: &HostingAccount) -> CoreResult<()>;

    async fn status_changed(
        &self,
        account: &HostingAccount,
        from: HostingStatus,
    ) -> CoreResult<()>;
}

/// Notifier that drops everything.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn account_created(&self, _account: &HostingAccount) -> CoreResult<()> {
        Ok(())
    }

    async fn status_changed(
        &self,
        _account: &HostingAccount,
        _from: HostingStatus,
    ) -> CoreResult<()> {
        Ok(())
    }
}
