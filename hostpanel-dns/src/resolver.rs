//! DNS resolver adapter over fixed public recursive resolvers.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    ResolveError, TokioResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::{ProtoErrorKind, op::ResponseCode},
};

use crate::delegation;
use crate::error::{DnsError, DnsResult};
use crate::name::normalize_host;

/// Per-attempt query timeout in seconds.
pub const QUERY_TIMEOUT_SECS: u64 = 5;

/// Recursive resolvers used for standard lookups (Google, Cloudflare).
pub const DEFAULT_UPSTREAMS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
];

/// DNS lookups needed for delegation checks.
///
/// Failures are returned, never logged as errors: a lookup that fails is
/// information for the caller's fallback logic.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// NS hostnames for `domain`, lowercased without trailing dot.
    async fn resolve_ns(&self, domain: &str) -> DnsResult<Vec<String>>;

    /// IPv4 addresses for `hostname`.
    async fn resolve_a(&self, hostname: &str) -> DnsResult<Vec<IpAddr>>;

    /// NS hostnames for `domain` as answered by `server` itself, without recursion.
    async fn query_delegated_ns(&self, domain: &str, server: IpAddr) -> DnsResult<Vec<String>>;
}

/// Settings for [`HickoryDnsResolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub upstreams: Vec<IpAddr>,
    pub timeout: Duration,
    pub attempts: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            upstreams: DEFAULT_UPSTREAMS.to_vec(),
            timeout: Duration::from_secs(QUERY_TIMEOUT_SECS),
            attempts: 2,
        }
    }
}

/// [`DnsResolver`] backed by hickory, with a fixed upstream set and no system configuration.
pub struct HickoryDnsResolver {
    resolver: TokioResolver,
    timeout: Duration,
}

impl HickoryDnsResolver {
    #[must_use]
    pub fn new(options: &ResolverOptions) -> Self {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&options.upstreams, 53, true),
        );
        let mut opts = ResolverOpts::default();
        opts.timeout = options.timeout;
        opts.attempts = options.attempts;
        // Delegation changes must be visible immediately.
        opts.cache_size = 0;

        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        Self {
            resolver,
            timeout: options.timeout,
        }
    }
}

impl Default for HickoryDnsResolver {
    fn default() -> Self {
        Self::new(&ResolverOptions::default())
    }
}

/// Fully-qualified form so search domains never apply.
fn fqdn(name: &str) -> String {
    format!("{}.", normalize_host(name))
}

/// Map a hickory resolution failure onto [`DnsError`].
fn map_resolve_error(err: &ResolveError, name: &str) -> DnsError {
    if err.is_nx_domain() {
        return DnsError::NotFound(name.to_string());
    }
    if let Some(proto) = err.proto() {
        match proto.kind() {
            ProtoErrorKind::NoRecordsFound { response_code, .. } => {
                return match *response_code {
                    ResponseCode::Refused => DnsError::Refused(name.to_string()),
                    ResponseCode::NoError | ResponseCode::NXDomain => {
                        DnsError::NotFound(name.to_string())
                    }
                    other => DnsError::Network(format!("{name}: {other}")),
                };
            }
            ProtoErrorKind::Timeout => return DnsError::Timeout(name.to_string()),
            _ => {}
        }
    }
    if err.is_no_records_found() {
        return DnsError::NotFound(name.to_string());
    }
    let text = err.to_string();
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("timed out") || lowered.contains("timeout") {
        DnsError::Timeout(name.to_string())
    } else if lowered.contains("refused") {
        DnsError::Refused(name.to_string())
    } else {
        DnsError::Network(format!("{name}: {text}"))
    }
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn resolve_ns(&self, domain: &str) -> DnsResult<Vec<String>> {
        let response = self
            .resolver
            .ns_lookup(fqdn(domain))
            .await
            .map_err(|e| map_resolve_error(&e, domain))?;

        let mut hosts: Vec<String> = Vec::new();
        for ns in response.iter() {
            let host = normalize_host(&ns.0.to_ascii());
            if !hosts.contains(&host) {
                hosts.push(host);
            }
        }
        if hosts.is_empty() {
            return Err(DnsError::NotFound(domain.to_string()));
        }
        log::debug!("NS {domain}: {hosts:?}");
        Ok(hosts)
    }

    async fn resolve_a(&self, hostname: &str) -> DnsResult<Vec<IpAddr>> {
        let response = self
            .resolver
            .ipv4_lookup(fqdn(hostname))
            .await
            .map_err(|e| map_resolve_error(&e, hostname))?;

        let ips: Vec<IpAddr> = response.iter().map(|a| IpAddr::V4(a.0)).collect();
        if ips.is_empty() {
            return Err(DnsError::NotFound(hostname.to_string()));
        }
        Ok(ips)
    }

    async fn query_delegated_ns(&self, domain: &str, server: IpAddr) -> DnsResult<Vec<String>> {
        delegation::query_delegated_ns(domain, server, self.timeout).await
    }
}
