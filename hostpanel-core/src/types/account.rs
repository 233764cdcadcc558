//! Hosting account entity and lifecycle status

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hostpanel_provider::{InternalUsername, ProviderUsername};

use crate::error::{CoreError, CoreResult};

/// Prefix marking an administrator-issued suspension reason.
pub const ADMIN_SUSPENSION_MARKER: &str = "[ADMIN] ";

/// Whether a stored suspension reason was issued by an administrator.
#[must_use]
pub fn is_admin_suspension(reason: &str) -> bool {
    let marker = ADMIN_SUSPENSION_MARKER.trim_end();
    reason
        .trim_start()
        .get(..marker.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(marker))
}

/// Lifecycle status of a hosting account.
///
/// `Suspending` and `Reactivating` mean the provider accepted a command that has
/// not been observed to take effect yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostingStatus {
    Pending,
    Active,
    Suspending,
    Suspended,
    Reactivating,
    Deleted,
}

impl HostingStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Active,
        Self::Suspending,
        Self::Suspended,
        Self::Reactivating,
        Self::Deleted,
    ];

    /// Statuses the reconciliation sweep looks at.
    pub const UNCONFIRMED: [Self; 3] = [Self::Pending, Self::Suspending, Self::Reactivating];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspending => "SUSPENDING",
            Self::Suspended => "SUSPENDED",
            Self::Reactivating => "REACTIVATING",
            Self::Deleted => "DELETED",
        }
    }

    /// An in-flight provider action awaiting confirmation.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Suspending | Self::Reactivating)
    }

    /// Whether the lifecycle permits moving from `self` to `to`.
    ///
    /// Besides the forward transitions, a stale `Suspending` may fall back to
    /// `Active` and a stale `Reactivating` to `Suspended`.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        use HostingStatus::{Active, Deleted, Pending, Reactivating, Suspended, Suspending};
        match (self, to) {
            (Deleted, _) => false,
            (_, Deleted) => true,
            (Pending, Active)
            | (Active, Suspending)
            | (Suspending, Suspended | Active)
            | (Suspended, Reactivating)
            | (Reactivating, Active | Suspended) => true,
            _ => false,
        }
    }

    /// [`can_transition_to`](Self::can_transition_to) as a `Result`.
    pub fn check_transition(self, to: Self) -> CoreResult<()> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for HostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::StorageError(format!("Unknown hosting status: {s}")))
    }
}

/// Control-panel password.
///
/// Retrievable by its owner (the panel needs it for deep links), so it is stored
/// reversibly, but it never appears in `Debug` output or in a serialized
/// [`HostingAccount`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountPassword(String);

impl AccountPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plaintext password.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A hosting account as mirrored from the reseller provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingAccount {
    pub id: String,
    pub owner_id: String,

    /// Login name chosen at creation; addresses create/suspend/unsuspend/passwd.
    pub internal_username: InternalUsername,
    /// Name issued by the provider; addresses the status query. Immutable.
    pub provider_username: ProviderUsername,

    pub domain: String,
    /// `true` for an owner-supplied domain, `false` for a subdomain of an allowed base domain.
    pub is_custom_domain: bool,
    pub label: Option<String>,

    /// Read through [`AccountPassword::expose`]; left out of serialized output.
    #[serde(skip_serializing, default)]
    pub password: AccountPassword,

    pub status: HostingStatus,
    pub suspension_reason: Option<String>,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub suspended_at: Option<DateTime<Utc>>,
    /// When the current `Suspending`/`Reactivating` state was entered.
    #[serde(default, with = "crate::utils::datetime::option")]
    pub transition_started_at: Option<DateTime<Utc>>,

    /// Set once the owner has opened the control panel; never cleared.
    pub cpanel_approved: bool,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub cpanel_approved_at: Option<DateTime<Utc>>,

    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
}

impl HostingAccount {
    /// Whether the current suspension was issued by an administrator.
    #[must_use]
    pub fn is_admin_suspended(&self) -> bool {
        self.suspension_reason
            .as_deref()
            .is_some_and(is_admin_suspension)
    }

    /// Drop reason, timestamp and transition marker.
    pub fn clear_suspension(&mut self) {
        self.suspension_reason = None;
        self.suspended_at = None;
        self.transition_started_at = None;
    }
}
