//! Request and result types of the hosting operations

use serde::{Deserialize, Serialize};

use hostpanel_provider::{DomainStatusEntry, ProviderStatus};

use super::account::{AccountPassword, HostingAccount, HostingStatus};

/// Which domain a new account is provisioned on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DomainChoice {
    /// `{label}.{base}` where `base` is one of the allowed base domains.
    Subdomain { label: String, base: String },
    /// A domain the owner controls; needs valid nameserver delegation.
    Custom { domain: String },
}

/// Create-account request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostingRequest {
    pub domain: DomainChoice,
    pub label: Option<String>,
    /// Contact address forwarded to the provider.
    pub contact_email: String,
}

/// Result of a successful creation. The password is returned once here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedHosting {
    pub account: HostingAccount,
    pub password: AccountPassword,
}

/// Outcome of a nameserver delegation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationCheck {
    pub valid: bool,
    pub current_nameservers: Vec<String>,
    pub required_nameservers: Vec<String>,
    pub message: String,
}

/// Outcome of a domain availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAvailability {
    pub domain: String,
    pub available: bool,
    /// Why the domain is unavailable, `None` when available.
    pub reason: Option<String>,
}

/// What a reconciliation pass did to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReconcileOutcome {
    Unchanged,
    /// The provider confirmed a pending or in-flight transition.
    Advanced { from: HostingStatus, to: HostingStatus },
    /// A transition went unconfirmed past the timeout and was rolled back.
    Reverted { from: HostingStatus, to: HostingStatus },
}

impl ReconcileOutcome {
    #[must_use]
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Account state after a status sync.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSync {
    pub account: HostingAccount,
    pub outcome: ReconcileOutcome,
}

/// The provider's point-in-time view of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSnapshot {
    /// The provider has no visible record yet.
    Unknown,
    Observed(ProviderStatus),
}

impl ProviderSnapshot {
    /// Pick the entry for `domain` from a status query answer.
    ///
    /// Falls back to the first entry when none carries the account's domain.
    #[must_use]
    pub fn from_entries(entries: &[DomainStatusEntry], domain: &str) -> Self {
        entries
            .iter()
            .find(|e| e.domain.eq_ignore_ascii_case(domain))
            .or_else(|| entries.first())
            .map_or(Self::Unknown, |e| Self::Observed(e.status.clone()))
    }
}

/// Counts from a reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub checked: usize,
    pub advanced: usize,
    pub reverted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl SweepReport {
    pub(crate) fn record(&mut self, outcome: Option<ReconcileOutcome>) {
        self.checked += 1;
        match outcome {
            Some(ReconcileOutcome::Advanced { .. }) => self.advanced += 1,
            Some(ReconcileOutcome::Reverted { .. }) => self.reverted += 1,
            Some(ReconcileOutcome::Unchanged) => self.unchanged += 1,
            None => self.failed += 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(status: &str, domain: &str) -> DomainStatusEntry {
        DomainStatusEntry {
            status: ProviderStatus::parse(status),
            domain: domain.to_string(),
        }
    }

    #[test]
    fn snapshot_prefers_matching_domain() {
        let entries = [
            entry("SUSPENDED", "other.example.net"),
            entry("ACTIVE", "demo.example.net"),
        ];
        assert_eq!(
            ProviderSnapshot::from_entries(&entries, "DEMO.example.net"),
            ProviderSnapshot::Observed(ProviderStatus::Active)
        );
    }

    #[test]
    fn snapshot_falls_back_to_first_entry() {
        let entries = [entry("SUSPENDED", "alias.example.net")];
        assert_eq!(
            ProviderSnapshot::from_entries(&entries, "demo.example.net"),
            ProviderSnapshot::Observed(ProviderStatus::Suspended)
        );
        assert_eq!(
            ProviderSnapshot::from_entries(&[], "demo.example.net"),
            ProviderSnapshot::Unknown
        );
    }

    #[test]
    fn sweep_report_counts() {
        let mut report = SweepReport::default();
        report.record(Some(ReconcileOutcome::Unchanged));
        report.record(None);
        report.record(Some(ReconcileOutcome::Advanced {
            from: HostingStatus::Pending,
            to: HostingStatus::Active,
        }));
        assert_eq!(report.checked, 3);
        assert_eq!((report.advanced, report.unchanged, report.failed), (1, 1, 1));
    }

    #[test]
    fn created_hosting_exposes_password_once() {
        let account = crate::test_utils::sample_account(
            "a1",
            "owner-1",
            "a1.hostprovider.net",
            HostingStatus::Pending,
        );
        let created = CreatedHosting {
            password: account.password.clone(),
            account,
        };

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["password"], "Initial12345");
        assert!(json["account"].get("password").is_none());
        assert_eq!(json.to_string().matches("Initial12345").count(), 1);
    }
}
