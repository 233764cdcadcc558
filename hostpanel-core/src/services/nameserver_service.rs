//! Nameserver delegation verification
//!
//! A domain passes when any of its NS hostnames equals, or is a subdomain of,
//! one of the required nameservers. Lookup failures are not errors here: a
//! `REFUSED` for a subdomain is exactly the case the parent lookup exists for.

use std::sync::Arc;

use hostpanel_dns::{DnsError, host_matches, label_count, parent_domain};

use crate::services::ServiceContext;
use crate::types::DelegationCheck;

/// Nameserver Verification Service
pub struct NameserverVerificationService {
    ctx: Arc<ServiceContext>,
}

impl NameserverVerificationService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// The nameservers custom domains must delegate to.
    pub async fn required_nameservers(&self) -> Vec<String> {
        self.ctx.config.current().await.nameservers.required()
    }

    /// Check whether `domain` (already normalized) delegates to the required set.
    ///
    /// 1. Direct NS lookup.
    /// 2. For names with more than two labels whose lookup failed: ask each parent
    ///    nameserver directly, without recursion, for the delegation records.
    /// 3. No explicit delegation, but the parent itself uses the required set:
    ///    the subdomain inherits it.
    pub async fn check_domain_delegation(&self, domain: &str) -> DelegationCheck {
        let required = self.required_nameservers().await;
        let resolver = &self.ctx.dns_resolver;

        let direct_failure = match resolver.resolve_ns(domain).await {
            Ok(current) => return verdict(domain, current, required),
            Err(e) => e,
        };
        log::debug!("NS lookup for {domain} failed ({direct_failure}), trying fallbacks");

        if label_count(domain) > 2
            && let Some(parent) = parent_domain(domain)
        {
            match resolver.resolve_ns(&parent).await {
                Ok(parent_ns) => {
                    if let Some(delegated) = self.ask_parent_nameservers(domain, &parent_ns).await {
                        return verdict(domain, delegated, required);
                    }
                    if any_match(&parent_ns, &required) {
                        log::debug!("{domain} inherits delegation from {parent}");
                        return DelegationCheck {
                            valid: true,
                            message: format!("{domain} is served by the nameservers of {parent}"),
                            current_nameservers: parent_ns,
                            required_nameservers: required,
                        };
                    }
                }
                Err(e) => log::debug!("NS lookup for parent {parent} failed: {e}"),
            }
        }

        DelegationCheck {
            valid: false,
            message: not_delegated_message(domain, &direct_failure, &required),
            current_nameservers: Vec::new(),
            required_nameservers: required,
        }
    }

    /// Ask each parent nameserver in turn; the first non-empty answer wins.
    async fn ask_parent_nameservers(&self, domain: &str, parent_ns: &[String]) -> Option<Vec<String>> {
        let resolver = &self.ctx.dns_resolver;
        for ns in parent_ns {
            let ip = match resolver.resolve_a(ns).await {
                Ok(ips) => match ips.first() {
                    Some(ip) => *ip,
                    None => continue,
                },
                Err(e) => {
                    log::debug!("Cannot resolve parent nameserver {ns}: {e}");
                    continue;
                }
            };
            match resolver.query_delegated_ns(domain, ip).await {
                Ok(hosts) if !hosts.is_empty() => {
                    log::debug!("{ns} ({ip}) delegates {domain} to {hosts:?}");
                    return Some(hosts);
                }
                Ok(_) => log::debug!("{ns} ({ip}) has no delegation for {domain}"),
                Err(e) => log::debug!("Delegation query for {domain} at {ns} ({ip}) failed: {e}"),
            }
        }
        None
    }
}

fn any_match(current: &[String], required: &[String]) -> bool {
    current
        .iter()
        .any(|host| required.iter().any(|req| host_matches(host, req)))
}

fn verdict(domain: &str, current: Vec<String>, required: Vec<String>) -> DelegationCheck {
    if any_match(&current, &required) {
        DelegationCheck {
            valid: true,
            message: format!("{domain} is delegated to the required nameservers"),
            current_nameservers: current,
            required_nameservers: required,
        }
    } else {
        DelegationCheck {
            valid: false,
            message: format!(
                "{domain} uses {}. Update its nameservers to {}",
                current.join(", "),
                required.join(", ")
            ),
            current_nameservers: current,
            required_nameservers: required,
        }
    }
}

fn not_delegated_message(domain: &str, failure: &DnsError, required: &[String]) -> String {
    let why = match failure {
        DnsError::Timeout(_) | DnsError::Network(_) => "could not be looked up right now",
        _ => "has no nameserver records",
    };
    format!(
        "{domain} {why}. Delegate it to {} and try again",
        required.join(", ")
    )
}
