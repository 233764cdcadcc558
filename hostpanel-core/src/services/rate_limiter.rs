//! Owner deactivation rate limit
//!
//! Stateless: the count is read from the `suspended_at` timestamps already
//! stored on the owner's accounts.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::HostingAccount;

pub struct RateLimiter {
    ctx: Arc<ServiceContext>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Whether `owner_id` may trigger another deactivation now.
    pub async fn allow_deactivate(&self, owner_id: &str) -> CoreResult<bool> {
        let policy = self.ctx.config.current().await.policy.clone();
        let accounts = self.ctx.account_repository.find_by_owner(owner_id).await?;
        let since = Utc::now() - policy.deactivation_window;
        Ok(recent_deactivations(&accounts, since) < policy.deactivation_limit)
    }

    /// [`allow_deactivate`](Self::allow_deactivate), as an error when denied.
    pub async fn check_deactivate(&self, owner_id: &str) -> CoreResult<()> {
        if self.allow_deactivate(owner_id).await? {
            return Ok(());
        }
        let config = self.ctx.config.current().await;
        let policy = &config.policy;
        Err(CoreError::RateLimited {
            limit: policy.deactivation_limit,
            window_hours: policy.deactivation_window.num_hours(),
        })
    }
}

/// Owner-triggered suspensions since `since`. Administrator suspensions do not count.
fn recent_deactivations(accounts: &[HostingAccount], since: DateTime<Utc>) -> usize {
    accounts
        .iter()
        .filter(|a| !a.is_admin_suspended())
        .filter(|a| a.suspended_at.is_some_and(|at| at > since))
        .count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    use crate::test_utils::{TestContext, sample_account};
    use crate::types::HostingStatus;

    fn suspended(id: &str, hours_ago: i64, reason: &str) -> HostingAccount {
        let mut account = sample_account(id, "owner-1", &format!("{id}.hostprovider.net"), HostingStatus::Suspended);
        account.suspended_at = Some(Utc::now() - TimeDelta::hours(hours_ago));
        account.suspension_reason = Some(reason.to_string());
        account
    }

    #[test]
    fn counts_only_window_and_owner_suspensions() {
        let accounts = vec![
            suspended("a", 1, "moving"),
            suspended("b", 13, "old"),
            suspended("c", 2, "[ADMIN] abuse"),
        ];
        assert_eq!(recent_deactivations(&accounts, Utc::now() - TimeDelta::hours(12)), 1);
    }

    #[tokio::test]
    async fn third_deactivation_in_window_denied() {
        let t = TestContext::builder().build().await;
        t.repo.insert(suspended("a", 1, "one")).await;
        let limiter = RateLimiter::new(t.ctx.clone());
        assert!(limiter.allow_deactivate("owner-1").await.unwrap());

        t.repo.insert(suspended("b", 3, "two")).await;
        assert!(!limiter.allow_deactivate("owner-1").await.unwrap());
        assert!(matches!(
            limiter.check_deactivate("owner-1").await,
            Err(CoreError::RateLimited { limit: 2, window_hours: 12 })
        ));
        assert!(limiter.allow_deactivate("owner-2").await.unwrap());
    }
}
