//! Hosting account lifecycle
//!
//! Every mutating operation follows the same shape: validate input, take the
//! account lock, re-read the row, check the state precondition, call the
//! provider, and finally write the row only if its status is still the one
//! that was checked. A provider failure therefore never changes stored state.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use hostpanel_provider::CreateAccountParams;

use crate::error::{CoreError, CoreResult};
use crate::services::{
    NameserverVerificationService, RateLimiter, ServiceContext, log_failure, reconcile, validation,
};
use crate::types::{
    ADMIN_SUSPENSION_MARKER, AccountPassword, CreateHostingRequest, CreatedHosting,
    DelegationCheck, DomainAvailability, HostingAccount, HostingStatus, ProviderSnapshot,
    ReconcileOutcome, StatusSync, SweepReport, is_admin_suspension,
};

/// Accounts reconciled in parallel by [`HostingService::reconcile_all`].
const SWEEP_CONCURRENCY: usize = 4;

/// Hosting Lifecycle Orchestrator
pub struct HostingService {
    ctx: Arc<ServiceContext>,
    nameservers: NameserverVerificationService,
    rate_limiter: RateLimiter,
}

impl HostingService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            nameservers: NameserverVerificationService::new(ctx.clone()),
            rate_limiter: RateLimiter::new(ctx.clone()),
            ctx,
        }
    }

    // ===== Queries =====

    /// Non-deleted accounts of `owner_id`.
    pub async fn list_accounts(&self, owner_id: &str) -> CoreResult<Vec<HostingAccount>> {
        self.ctx.account_repository.find_by_owner(owner_id).await
    }

    /// One account, visible only to its owner.
    pub async fn get_account(&self, owner_id: &str, account_id: &str) -> CoreResult<HostingAccount> {
        self.load_owned(owner_id, account_id).await
    }

    pub async fn required_nameservers(&self) -> Vec<String> {
        self.nameservers.required_nameservers().await
    }

    /// Validate `domain` and report its current delegation.
    pub async fn check_nameservers(&self, domain: &str) -> CoreResult<DelegationCheck> {
        let domain = validation::validate_custom_domain(domain)?;
        Ok(self.nameservers.check_domain_delegation(&domain).await)
    }

    /// Whether `domain` could be provisioned: free locally and on the provider.
    pub async fn check_domain_availability(&self, domain: &str) -> CoreResult<DomainAvailability> {
        let domain = validation::validate_custom_domain(domain)?;
        if self.ctx.account_repository.domain_in_use(&domain).await? {
            return Ok(DomainAvailability {
                domain,
                available: false,
                reason: Some("The domain is already used by another hosting account".to_string()),
            });
        }

        let available = self
            .ctx
            .reseller()
            .await
            .check_available(&domain)
            .await
            .map_err(|e| self.ctx.handle_provider_error("checkavailable", e))?;

        Ok(DomainAvailability {
            reason: (!available)
                .then(|| "The domain is already hosted with the provider".to_string()),
            domain,
            available,
        })
    }

    // ===== Provisioning =====

    /// Provision a new account in `PENDING`.
    ///
    /// Nothing is stored unless the provider accepted the account. The generated
    /// password is returned here once.
    pub async fn create_account(
        &self,
        owner_id: &str,
        request: CreateHostingRequest,
    ) -> CoreResult<CreatedHosting> {
        self.create_account_inner(owner_id, request)
            .await
            .inspect_err(|e| log_failure("Create account for owner", owner_id, e))
    }

    async fn create_account_inner(
        &self,
        owner_id: &str,
        request: CreateHostingRequest,
    ) -> CoreResult<CreatedHosting> {
        let config = self.ctx.config.current().await;
        let (domain, is_custom_domain) =
            validation::resolve_domain(&request.domain, &config.policy)?;
        let label = validation::validate_label(request.label.as_deref())?;
        let contact_email = validation::validate_contact_email(&request.contact_email)?;
        let max_accounts = config.policy.max_accounts_per_owner;

        let _guard = self.ctx.locks.lock_owner(owner_id).await;
        let repo = &self.ctx.account_repository;

        if repo.count_active_by_owner(owner_id).await? >= max_accounts {
            return Err(CoreError::AccountLimitReached(max_accounts));
        }
        if repo.domain_in_use(&domain).await? {
            return Err(CoreError::DomainTaken(domain));
        }
        if is_custom_domain {
            let check = self.nameservers.check_domain_delegation(&domain).await;
            if !check.valid {
                return Err(CoreError::DelegationFailed(check));
            }
        }

        let internal_username = validation::generate_internal_username();
        let password = AccountPassword::new(validation::generate_password());
        let params = CreateAccountParams {
            username: internal_username.clone(),
            password: password.expose().to_string(),
            contact_email,
            domain: domain.clone(),
            plan: config.reseller.plan.clone(),
        };
        let created = self
            .ctx
            .reseller()
            .await
            .create_account(&params)
            .await
            .map_err(|e| self.ctx.handle_provider_error("createacct", e))?;

        let now = Utc::now();
        let account = HostingAccount {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            internal_username,
            provider_username: created.provider_username,
            domain,
            is_custom_domain,
            label,
            password: password.clone(),
            status: HostingStatus::Pending,
            suspension_reason: None,
            suspended_at: None,
            transition_started_at: None,
            cpanel_approved: false,
            cpanel_approved_at: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = repo.insert_checked(&account, max_accounts).await {
            log::error!(
                "Provider created {} for {} but the account could not be stored: {e}",
                account.provider_username,
                account.domain
            );
            return Err(e);
        }

        log::info!(
            "Hosting account {} created for {} ({}, provider user {})",
            account.id,
            owner_id,
            account.domain,
            account.provider_username
        );
        self.ctx.notify_created(&account).await;

        Ok(CreatedHosting { account, password })
    }

    // ===== Owner transitions =====

    /// Ask the provider to suspend an ACTIVE account; it becomes `SUSPENDING`.
    ///
    /// The owner lock is held until the transition is stored, so the rate
    /// limit counts every deactivation of the owner's other accounts.
    pub async fn deactivate(
        &self,
        owner_id: &str,
        account_id: &str,
        reason: &str,
    ) -> CoreResult<HostingAccount> {
        async {
            let reason = validation::validate_reason(reason)?;
            if is_admin_suspension(&reason) {
                return Err(CoreError::InvalidReason(format!(
                    "the {} prefix is reserved for administrators",
                    ADMIN_SUSPENSION_MARKER.trim_end()
                )));
            }
            let _owner_guard = self.ctx.locks.lock_owner(owner_id).await;
            let _guard = self.ctx.locks.lock_account(account_id).await;
            let account = self.load_owned(owner_id, account_id).await?;
            ensure_can_suspend(&account)?;
            self.rate_limiter.check_deactivate(owner_id).await?;
            self.request_suspend(account, reason).await
        }
        .await
        .inspect_err(|e| log_failure("Deactivate", account_id, e))
    }

    /// Ask the provider to lift an owner suspension; the account becomes `REACTIVATING`.
    pub async fn reactivate(&self, owner_id: &str, account_id: &str) -> CoreResult<HostingAccount> {
        async {
            let _guard = self.ctx.locks.lock_account(account_id).await;
            let account = self.load_owned(owner_id, account_id).await?;
            ensure_can_reactivate(&account)?;
            if account.is_admin_suspended() {
                return Err(CoreError::AdminSuspended);
            }
            self.request_unsuspend(account).await
        }
        .await
        .inspect_err(|e| log_failure("Reactivate", account_id, e))
    }

    /// Replace the control-panel password of an ACTIVE account.
    ///
    /// The stored value changes only after the provider confirmed.
    pub async fn change_password(
        &self,
        owner_id: &str,
        account_id: &str,
        new_password: &str,
    ) -> CoreResult<()> {
        self.change_password_inner(owner_id, account_id, new_password)
            .await
            .inspect_err(|e| log_failure("Change password of", account_id, e))
    }

    async fn change_password_inner(
        &self,
        owner_id: &str,
        account_id: &str,
        new_password: &str,
    ) -> CoreResult<()> {
        validation::validate_password(new_password)?;
        let _guard = self.ctx.locks.lock_account(account_id).await;
        let account = self.load_owned(owner_id, account_id).await?;
        match account.status {
            HostingStatus::Active => {}
            s if s.is_transient() => return Err(CoreError::TransitionInProgress(s)),
            s => return Err(CoreError::NotActive(s)),
        }

        self.ctx
            .reseller()
            .await
            .change_password(&account.internal_username, new_password)
            .await
            .map_err(|e| self.ctx.handle_provider_error("passwd", e))?;

        let mut next = account.clone();
        next.password = AccountPassword::new(new_password);
        next.updated_at = Utc::now();
        self.commit(&next, account.status).await?;
        log::info!("Password changed for hosting account {account_id}");
        Ok(())
    }

    /// Record that the owner has opened the control panel. Idempotent.
    pub async fn mark_cpanel_approved(
        &self,
        owner_id: &str,
        account_id: &str,
    ) -> CoreResult<HostingAccount> {
        let _guard = self.ctx.locks.lock_account(account_id).await;
        let account = self.load_owned(owner_id, account_id).await?;
        if account.cpanel_approved {
            return Ok(account);
        }

        let now = Utc::now();
        let mut next = account.clone();
        next.cpanel_approved = true;
        next.cpanel_approved_at = Some(now);
        next.updated_at = now;
        self.commit(&next, account.status).await?;
        Ok(next)
    }

    /// Logical deletion. Frees the domain for reuse; the row stays.
    pub async fn delete_account(&self, owner_id: &str, account_id: &str) -> CoreResult<()> {
        let _guard = self.ctx.locks.lock_account(account_id).await;
        let account = self.load_owned(owner_id, account_id).await?;

        let mut next = account.clone();
        next.status = HostingStatus::Deleted;
        next.transition_started_at = None;
        next.updated_at = Utc::now();
        self.commit(&next, account.status).await?;

        log::info!("Hosting account {account_id} ({}) deleted", account.domain);
        self.ctx.notify_status_changed(&next, account.status).await;
        Ok(())
    }

    // ===== Administrator transitions =====

    /// Suspend on behalf of an administrator: the reason carries the admin
    /// marker, which blocks self-service reactivation, and the owner rate
    /// limit does not apply.
    pub async fn admin_suspend(&self, account_id: &str, reason: &str) -> CoreResult<HostingAccount> {
        async {
            let reason = validation::validate_reason(reason)?;
            let reason = if is_admin_suspension(&reason) {
                reason
            } else {
                validation::validate_reason(&format!("{ADMIN_SUSPENSION_MARKER}{reason}"))?
            };
            let _guard = self.ctx.locks.lock_account(account_id).await;
            let account = self.load_live(account_id).await?;
            ensure_can_suspend(&account)?;
            self.request_suspend(account, reason).await
        }
        .await
        .inspect_err(|e| log_failure("Admin suspend", account_id, e))
    }

    /// Reactivate regardless of who suspended the account.
    pub async fn admin_reactivate(&self, account_id: &str) -> CoreResult<HostingAccount> {
        async {
            let _guard = self.ctx.locks.lock_account(account_id).await;
            let account = self.load_live(account_id).await?;
            ensure_can_reactivate(&account)?;
            self.request_unsuspend(account).await
        }
        .await
        .inspect_err(|e| log_failure("Admin reactivate", account_id, e))
    }

    // ===== Reconciliation =====

    /// Reconcile one of the owner's accounts against the provider now.
    pub async fn sync_status(&self, owner_id: &str, account_id: &str) -> CoreResult<StatusSync> {
        self.load_owned(owner_id, account_id).await?;
        self.reconcile_account(account_id)
            .await
            .inspect_err(|e| log_failure("Sync", account_id, e))
    }

    /// Reconcile every PENDING, SUSPENDING and REACTIVATING account.
    ///
    /// One account failing does not stop the sweep; it is counted in
    /// [`SweepReport::failed`] and retried on the next run.
    pub async fn reconcile_all(&self) -> CoreResult<SweepReport> {
        let accounts = self
            .ctx
            .account_repository
            .find_by_statuses(&HostingStatus::UNCONFIRMED)
            .await?;

        let results: Vec<(String, CoreResult<StatusSync>)> = stream::iter(accounts)
            .map(|account| async move {
                let result = self.reconcile_account(&account.id).await;
                (account.id, result)
            })
            .buffer_unordered(SWEEP_CONCURRENCY)
            .collect()
            .await;

        let mut report = SweepReport::default();
        for (account_id, result) in results {
            match result {
                Ok(sync) => report.record(Some(sync.outcome)),
                Err(e) => {
                    log_failure("Reconcile", &account_id, &e);
                    report.record(None);
                }
            }
        }
        log::info!(
            "Reconciliation sweep: {} checked, {} advanced, {} reverted, {} failed",
            report.checked,
            report.advanced,
            report.reverted,
            report.failed
        );
        Ok(report)
    }

    async fn reconcile_account(&self, account_id: &str) -> CoreResult<StatusSync> {
        let _guard = self.ctx.locks.lock_account(account_id).await;
        let account = self.load_live(account_id).await?;
        if !HostingStatus::UNCONFIRMED.contains(&account.status) {
            return Ok(StatusSync {
                account,
                outcome: ReconcileOutcome::Unchanged,
            });
        }

        let entries = self
            .ctx
            .reseller()
            .await
            .get_user_domains(&account.provider_username)
            .await
            .map_err(|e| self.ctx.handle_provider_error("getuserdomains", e))?;
        let snapshot = ProviderSnapshot::from_entries(&entries, &account.domain);
        let timeout = self.ctx.config.current().await.policy.transition_timeout;

        let (next, outcome) = reconcile(&account, &snapshot, Utc::now(), timeout);
        if !outcome.is_change() {
            log::debug!("Account {account_id} unchanged ({}, provider {snapshot:?})", account.status);
            return Ok(StatusSync { account, outcome });
        }

        self.commit(&next, account.status).await?;
        match outcome {
            ReconcileOutcome::Reverted { from, to } => log::warn!(
                "Account {account_id}: provider never confirmed {from}, reverted to {to}"
            ),
            _ => log::info!("Account {account_id}: {} -> {}", account.status, next.status),
        }
        self.ctx.notify_status_changed(&next, account.status).await;
        Ok(StatusSync {
            account: next,
            outcome,
        })
    }

    // ===== Helpers =====

    async fn request_suspend(
        &self,
        account: HostingAccount,
        reason: String,
    ) -> CoreResult<HostingAccount> {
        self.ctx
            .reseller()
            .await
            .suspend_account(&account.internal_username, &reason)
            .await
            .map_err(|e| self.ctx.handle_provider_error("suspendacct", e))?;

        let now = Utc::now();
        let mut next = account.clone();
        next.status = HostingStatus::Suspending;
        next.suspension_reason = Some(reason);
        next.suspended_at = Some(now);
        next.transition_started_at = Some(now);
        next.updated_at = now;
        self.commit_after_provider(&next, account.status, "suspend")
            .await?;

        log::info!(
            "Suspension of {} ({}) accepted by provider",
            next.id,
            next.internal_username
        );
        self.ctx.notify_status_changed(&next, account.status).await;
        Ok(next)
    }

    async fn request_unsuspend(&self, account: HostingAccount) -> CoreResult<HostingAccount> {
        self.ctx
            .reseller()
            .await
            .unsuspend_account(&account.internal_username)
            .await
            .map_err(|e| self.ctx.handle_provider_error("unsuspendacct", e))?;

        let now = Utc::now();
        let mut next = account.clone();
        next.status = HostingStatus::Reactivating;
        next.transition_started_at = Some(now);
        next.updated_at = now;
        self.commit_after_provider(&next, account.status, "unsuspend")
            .await?;

        log::info!(
            "Reactivation of {} ({}) accepted by provider",
            next.id,
            next.internal_username
        );
        self.ctx.notify_status_changed(&next, account.status).await;
        Ok(next)
    }

    /// Write `next` only if the stored status is still `expected` and the
    /// lifecycle allows the move.
    async fn commit(&self, next: &HostingAccount, expected: HostingStatus) -> CoreResult<()> {
        if next.status != expected {
            expected.check_transition(next.status)?;
        }
        self.ctx
            .account_repository
            .update_if_status(next, expected)
            .await
    }

    async fn commit_after_provider(
        &self,
        next: &HostingAccount,
        expected: HostingStatus,
        action: &str,
    ) -> CoreResult<()> {
        self.commit(next, expected).await.inspect_err(|e| {
            log::error!(
                "Provider accepted {action} of {} but the new state could not be stored: {e}",
                next.id
            );
        })
    }

    async fn load_live(&self, account_id: &str) -> CoreResult<HostingAccount> {
        self.ctx
            .account_repository
            .find_by_id(account_id)
            .await?
            .filter(|a| a.status != HostingStatus::Deleted)
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))
    }

    /// Another owner's account looks exactly like a missing one.
    async fn load_owned(&self, owner_id: &str, account_id: &str) -> CoreResult<HostingAccount> {
        let account = self.load_live(account_id).await?;
        if account.owner_id != owner_id {
            return Err(CoreError::AccountNotFound(account_id.to_string()));
        }
        Ok(account)
    }
}

fn ensure_can_suspend(account: &HostingAccount) -> CoreResult<()> {
    match account.status {
        HostingStatus::Active => Ok(()),
        HostingStatus::Suspended => Err(CoreError::AlreadySuspended),
        s if s.is_transient() => Err(CoreError::TransitionInProgress(s)),
        s => Err(CoreError::NotActive(s)),
    }
}

fn ensure_can_reactivate(account: &HostingAccount) -> CoreResult<()> {
    match account.status {
        HostingStatus::Suspended => Ok(()),
        s if s.is_transient() => Err(CoreError::TransitionInProgress(s)),
        s => Err(CoreError::InvalidTransition {
            from: s,
            to: HostingStatus::Reactivating,
        }),
    }
}
