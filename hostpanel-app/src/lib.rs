//! Application bootstrap for the hosting panel.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter
//! injection) and the entry points for the scheduled reconciliation sweep
//! and explicit configuration reloads.

pub mod adapters;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hostpanel_core::config::HostPanelConfig;
use hostpanel_core::error::{CoreError, CoreResult};
use hostpanel_core::services::{HostingService, ServiceContext};
use hostpanel_core::traits::{HostingAccountRepository, NoopNotifier, Notifier, SettingsSource};
use hostpanel_core::types::SweepReport;
use hostpanel_core::ConfigService;
use hostpanel_dns::{DnsResolver, HickoryDnsResolver};
use hostpanel_provider::{MofhProvider, ResellerApi};

/// Application state.
///
/// Holds the `ServiceContext` and the hosting service. Every frontend
/// constructs this once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (storage, reseller client, resolver, configuration)
    pub ctx: Arc<ServiceContext>,
    /// Hosting lifecycle service
    pub hosting_service: Arc<HostingService>,
    /// Whether the reseller client was built from configuration and should
    /// be rebuilt on reload
    owns_reseller: bool,
    /// Set while a reconciliation sweep runs
    sweep_running: AtomicBool,
}

impl AppState {
    /// Run one reconciliation sweep over every unconfirmed account.
    ///
    /// Returns `None` without touching the provider when another sweep is
    /// still running.
    pub async fn run_reconciliation_sweep(&self) -> CoreResult<Option<SweepReport>> {
        if self
            .sweep_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Reconciliation sweep already running, skipping");
            return Ok(None);
        }

        let result = self.hosting_service.reconcile_all().await;
        self.sweep_running.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    /// Run the reconciliation sweep every `period` until the task is aborted.
    ///
    /// A failed sweep is logged and retried on the next tick.
    pub fn spawn_reconciliation(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = state.run_reconciliation_sweep().await {
                    log::error!("Reconciliation sweep failed: {e}");
                }
            }
        })
    }

    /// Re-read the settings source.
    ///
    /// On failure the previous configuration stays in effect. When the
    /// reseller client was built from configuration, it is rebuilt from the
    /// new snapshot so credential changes apply to subsequent calls.
    pub async fn reload_config(&self) -> CoreResult<Arc<HostPanelConfig>> {
        let config = self.ctx.config.reload().await?;
        if self.owns_reseller {
            let reseller = build_reseller(&config)?;
            self.ctx.replace_reseller(reseller).await;
            log::info!("Reseller client rebuilt for {}", config.reseller.credentials.api_url);
        }
        Ok(config)
    }
}

fn build_reseller(config: &HostPanelConfig) -> CoreResult<Arc<dyn ResellerApi>> {
    let provider = MofhProvider::new(
        config.reseller.credentials.clone(),
        config.reseller.client_options(),
    )?;
    Ok(Arc::new(provider))
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `account_repository`: where hosting accounts are stored
/// - `settings_source`: where operator settings come from
///
/// # Optional
/// - `reseller`: defaults to `MofhProvider` built from the settings
/// - `dns_resolver`: defaults to `HickoryDnsResolver`
/// - `notifier`: defaults to `NoopNotifier`
#[derive(Default)]
pub struct AppStateBuilder {
    account_repository: Option<Arc<dyn HostingAccountRepository>>,
    settings_source: Option<Arc<dyn SettingsSource>>,
    reseller: Option<Arc<dyn ResellerApi>>,
    dns_resolver: Option<Arc<dyn DnsResolver>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn account_repository(mut self, repo: Arc<dyn HostingAccountRepository>) -> Self {
        self.account_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn settings_source(mut self, source: Arc<dyn SettingsSource>) -> Self {
        self.settings_source = Some(source);
        self
    }

    #[must_use]
    pub fn reseller(mut self, reseller: Arc<dyn ResellerApi>) -> Self {
        self.reseller = Some(reseller);
        self
    }

    #[must_use]
    pub fn dns_resolver(mut self, resolver: Arc<dyn DnsResolver>) -> Self {
        self.dns_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Load the configuration and build the `AppState`.
    ///
    /// # Errors
    /// - `CoreError::ValidationError` if required adapters are missing
    /// - `CoreError::ConfigError` if the settings are incomplete or malformed
    pub async fn build(self) -> CoreResult<AppState> {
        let account_repository = self.account_repository.ok_or_else(|| {
            CoreError::ValidationError("account_repository is required".to_string())
        })?;
        let settings_source = self.settings_source.ok_or_else(|| {
            CoreError::ValidationError("settings_source is required".to_string())
        })?;

        let config = Arc::new(ConfigService::load(settings_source).await?);

        let owns_reseller = self.reseller.is_none();
        let reseller = match self.reseller {
            Some(reseller) => reseller,
            None => build_reseller(&*config.current().await)?,
        };
        let dns_resolver = self
            .dns_resolver
            .unwrap_or_else(|| Arc::new(HickoryDnsResolver::default()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier));

        let ctx = Arc::new(ServiceContext::new(
            account_repository,
            reseller,
            dns_resolver,
            notifier,
            config,
        ));
        let hosting_service = Arc::new(HostingService::new(Arc::clone(&ctx)));

        Ok(AppState {
            ctx,
            hosting_service,
            owns_reseller,
            sweep_running: AtomicBool::new(false),
        })
    }
}
