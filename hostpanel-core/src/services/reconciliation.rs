//! Provider state reconciliation
//!
//! [`reconcile`] is a pure function of the stored account, the provider's view
//! and the clock, so every scheduling path (page polling, sweeps, manual
//! sync) shares one set of rules and tests need no network.

use chrono::{DateTime, TimeDelta, Utc};

use hostpanel_provider::ProviderStatus;

use crate::types::{HostingAccount, HostingStatus, ProviderSnapshot, ReconcileOutcome};

/// Advance, or roll back, `account` according to `snapshot`.
///
/// | Stored | Provider | Result |
/// |---|---|---|
/// | PENDING | active | ACTIVE |
/// | REACTIVATING | active | ACTIVE, suspension cleared |
/// | SUSPENDING | suspended | SUSPENDED |
/// | SUSPENDING | active, for longer than `transition_timeout` | ACTIVE (revert) |
/// | REACTIVATING | suspended, for longer than `transition_timeout` | SUSPENDED (revert) |
///
/// Everything else is left alone; in particular a confirmed state never
/// moves, and an unknown or unrecognized provider answer never moves anything.
#[must_use]
pub fn reconcile(
    account: &HostingAccount,
    snapshot: &ProviderSnapshot,
    now: DateTime<Utc>,
    transition_timeout: TimeDelta,
) -> (HostingAccount, ReconcileOutcome) {
    let ProviderSnapshot::Observed(observed) = snapshot else {
        return (account.clone(), ReconcileOutcome::Unchanged);
    };

    let from = account.status;
    let stale = || {
        let started = account.transition_started_at.unwrap_or(account.updated_at);
        now - started >= transition_timeout
    };

    let mut next = account.clone();
    let outcome = match (from, observed) {
        (HostingStatus::Pending, ProviderStatus::Active) => {
            next.status = HostingStatus::Active;
            next.transition_started_at = None;
            ReconcileOutcome::Advanced { from, to: HostingStatus::Active }
        }
        (HostingStatus::Reactivating, ProviderStatus::Active) => {
            next.status = HostingStatus::Active;
            next.clear_suspension();
            ReconcileOutcome::Advanced { from, to: HostingStatus::Active }
        }
        (HostingStatus::Suspending, ProviderStatus::Suspended) => {
            next.status = HostingStatus::Suspended;
            next.transition_started_at = None;
            ReconcileOutcome::Advanced { from, to: HostingStatus::Suspended }
        }
        (HostingStatus::Suspending, ProviderStatus::Active) if stale() => {
            next.status = HostingStatus::Active;
            next.clear_suspension();
            ReconcileOutcome::Reverted { from, to: HostingStatus::Active }
        }
        (HostingStatus::Reactivating, ProviderStatus::Suspended) if stale() => {
            next.status = HostingStatus::Suspended;
            next.transition_started_at = None;
            ReconcileOutcome::Reverted { from, to: HostingStatus::Suspended }
        }
        _ => return (account.clone(), ReconcileOutcome::Unchanged),
    };
    next.updated_at = now;
    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::sample_account;

    const TIMEOUT: TimeDelta = TimeDelta::minutes(30);

    fn account(status: HostingStatus) -> HostingAccount {
        let mut a = sample_account("acc-1", "owner-1", "demo.hostprovider.net", status);
        if status.is_transient() {
            a.transition_started_at = Some(Utc::now());
            a.suspension_reason = Some("spam".to_string());
            a.suspended_at = Some(Utc::now());
        }
        a
    }

    fn observed(status: &str) -> ProviderSnapshot {
        ProviderSnapshot::Observed(ProviderStatus::parse(status))
    }

    #[test]
    fn reactivating_confirmed_clears_suspension() {
        let (next, outcome) = reconcile(
            &account(HostingStatus::Reactivating),
            &observed("ACTIVE"),
            Utc::now(),
            TIMEOUT,
        );
        assert_eq!(next.status, HostingStatus::Active);
        assert_eq!(next.suspension_reason, None);
        assert_eq!(next.suspended_at, None);
        assert_eq!(next.transition_started_at, None);
        assert_eq!(
            outcome,
            ReconcileOutcome::Advanced {
                from: HostingStatus::Reactivating,
                to: HostingStatus::Active
            }
        );
    }

    #[test]
    fn pending_and_suspending_advance() {
        let now = Utc::now();
        let (next, _) = reconcile(&account(HostingStatus::Pending), &observed("active"), now, TIMEOUT);
        assert_eq!(next.status, HostingStatus::Active);

        let (next, _) = reconcile(&account(HostingStatus::Suspending), &observed("SUSPENDED"), now, TIMEOUT);
        assert_eq!(next.status, HostingStatus::Suspended);
        assert_eq!(next.suspension_reason.as_deref(), Some("spam"));
        assert!(next.suspended_at.is_some());
    }

    #[test]
    fn idempotent() {
        let now = Utc::now();
        for status in HostingStatus::ALL {
            for snapshot in [observed("ACTIVE"), observed("SUSPENDED"), observed("PENDING"), ProviderSnapshot::Unknown] {
                let (once, _) = reconcile(&account(status), &snapshot, now, TIMEOUT);
                let (twice, second) = reconcile(&once, &snapshot, now, TIMEOUT);
                assert_eq!(once, twice, "{status} / {snapshot:?}");
                assert_eq!(second, ReconcileOutcome::Unchanged);
            }
        }
    }

    #[test]
    fn confirmed_states_never_regress() {
        let later = Utc::now() + TimeDelta::days(1);
        for status in [HostingStatus::Active, HostingStatus::Suspended, HostingStatus::Deleted] {
            for snapshot in [observed("ACTIVE"), observed("SUSPENDED"), observed("PENDING"), ProviderSnapshot::Unknown] {
                let (next, outcome) = reconcile(&account(status), &snapshot, later, TIMEOUT);
                assert_eq!(next.status, status);
                assert_eq!(outcome, ReconcileOutcome::Unchanged);
            }
        }
    }

    #[test]
    fn unknown_provider_record_keeps_pending() {
        let (next, outcome) = reconcile(
            &account(HostingStatus::Pending),
            &ProviderSnapshot::Unknown,
            Utc::now() + TimeDelta::days(3),
            TIMEOUT,
        );
        assert_eq!(next.status, HostingStatus::Pending);
        assert_eq!(outcome, ReconcileOutcome::Unchanged);
    }

    #[test]
    fn fresh_transition_waits_for_provider() {
        let a = account(HostingStatus::Suspending);
        let soon = a.transition_started_at.unwrap_or_default() + TimeDelta::minutes(5);
        let (next, outcome) = reconcile(&a, &observed("ACTIVE"), soon, TIMEOUT);
        assert_eq!(next.status, HostingStatus::Suspending);
        assert_eq!(outcome, ReconcileOutcome::Unchanged);
    }

    #[test]
    fn stale_transitions_revert() {
        let a = account(HostingStatus::Suspending);
        let late = a.transition_started_at.unwrap_or_default() + TimeDelta::minutes(31);
        let (next, outcome) = reconcile(&a, &observed("ACTIVE"), late, TIMEOUT);
        assert_eq!(next.status, HostingStatus::Active);
        assert_eq!(next.suspended_at, None);
        assert!(matches!(outcome, ReconcileOutcome::Reverted { .. }));

        let b = account(HostingStatus::Reactivating);
        let late = b.transition_started_at.unwrap_or_default() + TimeDelta::minutes(31);
        let (next, outcome) = reconcile(&b, &observed("SUSPENDED"), late, TIMEOUT);
        assert_eq!(next.status, HostingStatus::Suspended);
        assert_eq!(next.suspension_reason.as_deref(), Some("spam"));
        assert_eq!(
            outcome,
            ReconcileOutcome::Reverted {
                from: HostingStatus::Reactivating,
                to: HostingStatus::Suspended
            }
        );
    }

    #[test]
    fn unrecognized_provider_status_is_ignored() {
        let a = account(HostingStatus::Suspending);
        let late = Utc::now() + TimeDelta::hours(2);
        let (next, _) = reconcile(&a, &observed("REACTIVATING"), late, TIMEOUT);
        assert_eq!(next.status, HostingStatus::Suspending);
    }
}
