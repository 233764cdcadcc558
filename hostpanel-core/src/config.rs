//! Operator configuration
//!
//! Settings arrive as a flat key-value blob (see [`SettingsSource`]) and are
//! turned into a typed [`HostPanelConfig`] once per process. Services read
//! immutable snapshots; a new snapshot only appears on [`ConfigService::reload`].

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::RwLock;

use hostpanel_provider::{ClientOptions, ResellerCredentials};

use crate::error::{CoreError, CoreResult};
use crate::traits::SettingsSource;

/// Nameservers required when the operator configures none.
pub const DEFAULT_NAMESERVERS: [&str; 5] = [
    "ns1.byet.org",
    "ns2.byet.org",
    "ns3.byet.org",
    "ns4.byet.org",
    "ns5.byet.org",
];

pub const DEFAULT_MAX_ACCOUNTS_PER_OWNER: usize = 3;
pub const DEFAULT_DEACTIVATION_LIMIT: usize = 2;
pub const DEFAULT_DEACTIVATION_WINDOW_HOURS: i64 = 12;
pub const DEFAULT_TRANSITION_TIMEOUT_MINUTES: i64 = 30;

const RESELLER_PREFIX: &str = "reseller.";

/// Reseller API connection settings.
#[derive(Debug, Clone)]
pub struct ResellerConfig {
    pub credentials: ResellerCredentials,
    /// Hosting plan name passed to `createacct`.
    pub plan: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl ResellerConfig {
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..ClientOptions::default()
        }
    }
}

/// Required nameserver set.
#[derive(Debug, Clone, Default)]
pub struct NameserverConfig {
    /// Operator override, normalized to lowercase without trailing dots.
    pub custom: Vec<String>,
}

impl NameserverConfig {
    /// The operator list, or [`DEFAULT_NAMESERVERS`] when it is empty.
    #[must_use]
    pub fn required(&self) -> Vec<String> {
        if self.custom.is_empty() {
            DEFAULT_NAMESERVERS.iter().map(ToString::to_string).collect()
        } else {
            self.custom.clone()
        }
    }
}

/// Business limits.
#[derive(Debug, Clone)]
pub struct HostingPolicy {
    /// Base domains owners may take free subdomains under.
    pub allowed_domains: Vec<String>,
    pub max_accounts_per_owner: usize,
    /// Deactivations allowed per owner within `deactivation_window`.
    pub deactivation_limit: usize,
    pub deactivation_window: TimeDelta,
    /// How long a SUSPENDING/REACTIVATING account may go unconfirmed before it is reverted.
    pub transition_timeout: TimeDelta,
}

impl Default for HostingPolicy {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            max_accounts_per_owner: DEFAULT_MAX_ACCOUNTS_PER_OWNER,
            deactivation_limit: DEFAULT_DEACTIVATION_LIMIT,
            deactivation_window: TimeDelta::hours(DEFAULT_DEACTIVATION_WINDOW_HOURS),
            transition_timeout: TimeDelta::minutes(DEFAULT_TRANSITION_TIMEOUT_MINUTES),
        }
    }
}

impl HostingPolicy {
    #[must_use]
    pub fn is_allowed_base(&self, base: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(base))
    }
}

/// Typed configuration snapshot.
#[derive(Debug, Clone)]
pub struct HostPanelConfig {
    pub reseller: ResellerConfig,
    pub nameservers: NameserverConfig,
    pub policy: HostingPolicy,
}

impl HostPanelConfig {
    /// Build from the flat settings blob.
    ///
    /// # Errors
    /// [`CoreError::ConfigError`] for missing reseller settings or malformed numbers.
    pub fn from_settings(settings: &HashMap<String, String>) -> CoreResult<Self> {
        let reseller_map: HashMap<String, String> = settings
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(RESELLER_PREFIX)
                    .map(|field| (field.to_string(), v.clone()))
            })
            .collect();
        let credentials = ResellerCredentials::from_map(&reseller_map)
            .map_err(|e| CoreError::ConfigError(format!("reseller credentials: {e}")))?;

        let plan = get(settings, "reseller.plan")
            .ok_or_else(|| CoreError::ConfigError("Missing setting: reseller.plan".to_string()))?
            .to_string();

        let defaults = ClientOptions::default();
        let reseller = ResellerConfig {
            credentials,
            plan,
            timeout_secs: parse_or(settings, "reseller.timeout_secs", defaults.timeout.as_secs())?,
            max_retries: parse_or(settings, "reseller.max_retries", defaults.max_retries)?,
        };

        let nameservers = NameserverConfig {
            custom: split_list(get(settings, "nameservers.custom").unwrap_or_default()),
        };

        let policy = HostingPolicy {
            allowed_domains: split_list(get(settings, "hosting.allowed_domains").unwrap_or_default()),
            max_accounts_per_owner: parse_or(
                settings,
                "hosting.max_accounts_per_owner",
                DEFAULT_MAX_ACCOUNTS_PER_OWNER,
            )?,
            deactivation_limit: parse_or(
                settings,
                "hosting.deactivation_limit",
                DEFAULT_DEACTIVATION_LIMIT,
            )?,
            deactivation_window: TimeDelta::hours(parse_or(
                settings,
                "hosting.deactivation_window_hours",
                DEFAULT_DEACTIVATION_WINDOW_HOURS,
            )?),
            transition_timeout: TimeDelta::minutes(parse_or(
                settings,
                "hosting.transition_timeout_minutes",
                DEFAULT_TRANSITION_TIMEOUT_MINUTES,
            )?),
        };

        Ok(Self {
            reseller,
            nameservers,
            policy,
        })
    }
}

fn get<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(settings: &HashMap<String, String>, key: &str, default: T) -> CoreResult<T> {
    match get(settings, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| CoreError::ConfigError(format!("Invalid value for {key}: '{raw}'"))),
    }
}

/// Comma or whitespace separated hostnames, lowercased, trailing dots removed.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Holds the current configuration snapshot.
pub struct ConfigService {
    source: Arc<dyn SettingsSource>,
    current: RwLock<Arc<HostPanelConfig>>,
}

impl ConfigService {
    /// Read the settings source once and build the first snapshot.
    pub async fn load(source: Arc<dyn SettingsSource>) -> CoreResult<Self> {
        let config = HostPanelConfig::from_settings(&source.load().await?)?;
        Ok(Self {
            source,
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// Current snapshot.
    pub async fn current(&self) -> Arc<HostPanelConfig> {
        self.current.read().await.clone()
    }

    /// Re-read the source. On failure the previous snapshot stays in effect.
    pub async fn reload(&self) -> CoreResult<Arc<HostPanelConfig>> {
        let settings = self.source.load().await?;
        let config = Arc::new(HostPanelConfig::from_settings(&settings).inspect_err(|e| {
            log::error!("Config reload rejected, keeping previous settings: {e}");
        })?);
        *self.current.write().await = config.clone();
        log::info!(
            "Config reloaded: {} required nameservers, {} allowed base domains",
            config.nameservers.required().len(),
            config.policy.allowed_domains.len()
        );
        Ok(config)
    }
}
