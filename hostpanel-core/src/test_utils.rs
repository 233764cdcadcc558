//! Test helper module
//!
//! Mock collaborators and factories for service tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use hostpanel_dns::{DnsError, DnsResolver, DnsResult, normalize_host};
use hostpanel_provider::{
    CreateAccountParams, CreatedAccount, DomainStatusEntry, InternalUsername, ProviderError,
    ProviderStatus, ProviderUsername, ResellerApi,
};

use crate::config::ConfigService;
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{HostingAccountRepository, InMemorySettings, Notifier};
use crate::types::{AccountPassword, HostingAccount, HostingStatus};

// ===== MockHostingAccountRepository =====

pub struct MockHostingAccountRepository {
    accounts: RwLock<HashMap<String, HostingAccount>>,
    /// When set, every write fails with this message
    save_error: RwLock<Option<String>>,
}

impl MockHostingAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            save_error: RwLock::new(None),
        }
    }

    pub async fn set_save_error(&self, err: Option<String>) {
        *self.save_error.write().await = err;
    }

    /// Store a row directly, bypassing all checks.
    pub async fn insert(&self, account: HostingAccount) {
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }

    pub async fn get(&self, id: &str) -> Option<HostingAccount> {
        self.accounts.read().await.get(id).cloned()
    }

    async fn check_writable(&self) -> CoreResult<()> {
        match &*self.save_error.read().await {
            Some(msg) => Err(CoreError::StorageError(msg.clone())),
            None => Ok(()),
        }
    }
}

fn is_live(account: &HostingAccount) -> bool {
    account.status != HostingStatus::Deleted
}

#[async_trait]
impl HostingAccountRepository for MockHostingAccountRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<HostingAccount>> {
        Ok(self.get(id).await)
    }

    async fn find_by_owner(&self, owner_id: &str) -> CoreResult<Vec<HostingAccount>> {
        let mut accounts: Vec<HostingAccount> = self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.owner_id == owner_id && is_live(a))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn find_by_statuses(
        &self,
        statuses: &[HostingStatus],
    ) -> CoreResult<Vec<HostingAccount>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| statuses.contains(&a.status))
            .cloned()
            .collect())
    }

    async fn domain_in_use(&self, domain: &str) -> CoreResult<bool> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .any(|a| is_live(a) && a.domain.eq_ignore_ascii_case(domain)))
    }

    async fn count_active_by_owner(&self, owner_id: &str) -> CoreResult<usize> {
        Ok(self.find_by_owner(owner_id).await?.len())
    }

    async fn insert_checked(
        &self,
        account: &HostingAccount,
        max_per_owner: usize,
    ) -> CoreResult<()> {
        self.check_writable().await?;
        let mut accounts = self.accounts.write().await;
        let live = || accounts.values().filter(|a| is_live(a));
        if live().any(|a| a.domain.eq_ignore_ascii_case(&account.domain)) {
            return Err(CoreError::DomainTaken(account.domain.clone()));
        }
        if live().filter(|a| a.owner_id == account.owner_id).count() >= max_per_owner {
            return Err(CoreError::AccountLimitReached(max_per_owner));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        account: &HostingAccount,
        expected: HostingStatus,
    ) -> CoreResult<()> {
        self.check_writable().await?;
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get(&account.id)
            .ok_or_else(|| CoreError::AccountNotFound(account.id.clone()))?;
        if stored.status != expected {
            return Err(CoreError::ConcurrentModification(account.id.clone()));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }
}

// ===== MockResellerApi =====

/// One recorded provider call, with the identifier it was addressed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResellerCall {
    CreateAccount {
        username: String,
        domain: String,
        plan: String,
    },
    Suspend {
        username: String,
        reason: String,
    },
    Unsuspend {
        username: String,
    },
    ChangePassword {
        username: String,
        password: String,
    },
    GetUserDomains {
        username: String,
    },
    CheckAvailable {
        domain: String,
    },
}

pub struct MockResellerApi {
    calls: Mutex<Vec<ResellerCall>>,
    next_error: Mutex<Option<ProviderError>>,
    domains: Mutex<Vec<DomainStatusEntry>>,
    available: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
}

impl MockResellerApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
            domains: Mutex::new(Vec::new()),
            available: Mutex::new(true),
            delay: Mutex::new(None),
        }
    }

    pub async fn calls(&self) -> Vec<ResellerCall> {
        self.calls.lock().await.clone()
    }

    /// Make the next call fail with `err`.
    pub async fn fail_next(&self, err: ProviderError) {
        *self.next_error.lock().await = Some(err);
    }

    /// Status query answer, as `(status, domain)` tuples.
    pub async fn set_domains(&self, entries: &[(&str, &str)]) {
        *self.domains.lock().await = entries
            .iter()
            .map(|(status, domain)| DomainStatusEntry {
                status: ProviderStatus::parse(status),
                domain: (*domain).to_string(),
            })
            .collect();
    }

    pub async fn set_available(&self, available: bool) {
        *self.available.lock().await = available;
    }

    /// Hold every call for `delay` after recording it, like a slow panel.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    async fn record(&self, call: ResellerCall) -> hostpanel_provider::Result<()> {
        self.calls.lock().await.push(call);
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_error.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResellerApi for MockResellerApi {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn create_account(
        &self,
        params: &CreateAccountParams,
    ) -> hostpanel_provider::Result<CreatedAccount> {
        self.record(ResellerCall::CreateAccount {
            username: params.username.to_string(),
            domain: params.domain.clone(),
            plan: params.plan.clone(),
        })
        .await?;
        Ok(CreatedAccount {
            provider_username: ProviderUsername::new("epiz_30000001"),
            message: String::new(),
        })
    }

    async fn suspend_account(
        &self,
        username: &InternalUsername,
        reason: &str,
    ) -> hostpanel_provider::Result<()> {
        self.record(ResellerCall::Suspend {
            username: username.to_string(),
            reason: reason.to_string(),
        })
        .await
    }

    async fn unsuspend_account(&self, username: &InternalUsername) -> hostpanel_provider::Result<()> {
        self.record(ResellerCall::Unsuspend {
            username: username.to_string(),
        })
        .await
    }

    async fn change_password(
        &self,
        username: &InternalUsername,
        new_password: &str,
    ) -> hostpanel_provider::Result<()> {
        self.record(ResellerCall::ChangePassword {
            username: username.to_string(),
            password: new_password.to_string(),
        })
        .await
    }

    async fn get_user_domains(
        &self,
        username: &ProviderUsername,
    ) -> hostpanel_provider::Result<Vec<DomainStatusEntry>> {
        self.record(ResellerCall::GetUserDomains {
            username: username.to_string(),
        })
        .await?;
        Ok(self.domains.lock().await.clone())
    }

    async fn check_available(&self, domain: &str) -> hostpanel_provider::Result<bool> {
        self.record(ResellerCall::CheckAvailable {
            domain: domain.to_string(),
        })
        .await?;
        Ok(*self.available.lock().await)
    }
}

pub fn provider_rejected(message: &str) -> ProviderError {
    ProviderError::Rejected {
        provider: "mock".to_string(),
        raw_message: message.to_string(),
    }
}

pub fn provider_timeout() -> ProviderError {
    ProviderError::Timeout {
        provider: "mock".to_string(),
        detail: "operation timed out".to_string(),
    }
}

// ===== MockDnsResolver =====

/// Canned DNS answers. Anything not configured is `NotFound`.
#[derive(Default)]
pub struct MockDnsResolver {
    ns: HashMap<String, DnsResult<Vec<String>>>,
    a: HashMap<String, Vec<IpAddr>>,
    delegated: HashMap<(String, IpAddr), Vec<String>>,
}

fn hosts(list: &[&str]) -> Vec<String> {
    list.iter().map(|h| normalize_host(h)).collect()
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ns(mut self, domain: &str, nameservers: &[&str]) -> Self {
        self.ns.insert(domain.to_string(), Ok(hosts(nameservers)));
        self
    }

    pub fn with_ns_error(mut self, domain: &str, err: DnsError) -> Self {
        self.ns.insert(domain.to_string(), Err(err));
        self
    }

    pub fn with_a(mut self, hostname: &str, ip: IpAddr) -> Self {
        self.a.entry(normalize_host(hostname)).or_default().push(ip);
        self
    }

    pub fn with_delegated(mut self, domain: &str, server: IpAddr, nameservers: &[&str]) -> Self {
        self.delegated
            .insert((domain.to_string(), server), hosts(nameservers));
        self
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve_ns(&self, domain: &str) -> DnsResult<Vec<String>> {
        self.ns
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Err(DnsError::NotFound(domain.to_string())))
    }

    async fn resolve_a(&self, hostname: &str) -> DnsResult<Vec<IpAddr>> {
        self.a
            .get(&normalize_host(hostname))
            .cloned()
            .ok_or_else(|| DnsError::NotFound(hostname.to_string()))
    }

    async fn query_delegated_ns(&self, domain: &str, server: IpAddr) -> DnsResult<Vec<String>> {
        self.delegated
            .get(&(domain.to_string(), server))
            .cloned()
            .ok_or_else(|| DnsError::Refused(domain.to_string()))
    }
}

// ===== RecordingNotifier =====

pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn events(&self) -> Vec<String> {
        self.events.lock().await.clone()
    }

    fn outcome(&self) -> CoreResult<()> {
        if self.fail {
            Err(CoreError::ConfigError("SMTP not configured".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn account_created(&self, account: &HostingAccount) -> CoreResult<()> {
        self.outcome()?;
        self.events
            .lock()
            .await
            .push(format!("created:{}", account.domain));
        Ok(())
    }

    async fn status_changed(&self, account: &HostingAccount, from: HostingStatus) -> CoreResult<()> {
        self.outcome()?;
        self.events
            .lock()
            .await
            .push(format!("status:{from}->{}", account.status));
        Ok(())
    }
}

// ===== Factories =====

pub fn test_settings() -> HashMap<String, String> {
    [
        ("reseller.api_url", "https://panel.example.net:2087"),
        ("reseller.api_username", "reseller"),
        ("reseller.api_password", "key123"),
        ("reseller.plan", "free"),
        ("hosting.allowed_domains", "hostprovider.net"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// An account row with fixed usernames; only the given fields vary.
pub fn sample_account(id: &str, owner_id: &str, domain: &str, status: HostingStatus) -> HostingAccount {
    let now = Utc::now();
    HostingAccount {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        internal_username: InternalUsername::new("abcd1234"),
        provider_username: ProviderUsername::new("epiz_12345678"),
        domain: domain.to_string(),
        is_custom_domain: false,
        label: None,
        password: AccountPassword::new("Initial12345"),
        status,
        suspension_reason: None,
        suspended_at: None,
        transition_started_at: None,
        cpanel_approved: false,
        cpanel_approved_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// A wired [`ServiceContext`] plus handles on its mocks.
pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub repo: Arc<MockHostingAccountRepository>,
    pub reseller: Arc<MockResellerApi>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub fn builder() -> TestContextBuilder {
        TestContextBuilder {
            dns: MockDnsResolver::new(),
            settings: test_settings(),
            notifier: RecordingNotifier::new(),
        }
    }
}

pub struct TestContextBuilder {
    dns: MockDnsResolver,
    settings: HashMap<String, String>,
    notifier: RecordingNotifier,
}

impl TestContextBuilder {
    pub fn dns(mut self, dns: MockDnsResolver) -> Self {
        self.dns = dns;
        self
    }

    pub fn setting(mut self, key: &str, value: &str) -> Self {
        self.settings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn failing_notifier(mut self) -> Self {
        self.notifier = RecordingNotifier::failing();
        self
    }

    pub async fn build(self) -> TestContext {
        let repo = Arc::new(MockHostingAccountRepository::new());
        let reseller = Arc::new(MockResellerApi::new());
        let notifier = Arc::new(self.notifier);
        let config = ConfigService::load(Arc::new(InMemorySettings::new(self.settings)))
            .await
            .unwrap();
        let ctx = Arc::new(ServiceContext::new(
            repo.clone(),
            reseller.clone(),
            Arc::new(self.dns),
            notifier.clone(),
            Arc::new(config),
        ));
        TestContext {
            ctx,
            repo,
            reseller,
            notifier,
        }
    }
}
