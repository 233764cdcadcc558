//! DNS resolver adapter for hosting-account delegation checks
//!
//! Standard NS/A lookups go through a fixed set of public recursive resolvers
//! ([`HickoryDnsResolver`]). When those fail for a subdomain,
//! [`DnsResolver::query_delegated_ns`] asks a parent nameserver directly with
//! recursion disabled and reads the referral.

mod delegation;
mod error;
mod name;
mod resolver;

pub use delegation::{build_ns_query, parse_ns_response};
pub use error::{DnsError, DnsResult};
pub use name::{host_matches, label_count, normalize_host, parent_domain, validate_domain};
pub use resolver::{
    DEFAULT_UPSTREAMS, DnsResolver, HickoryDnsResolver, QUERY_TIMEOUT_SECS, ResolverOptions,
};
