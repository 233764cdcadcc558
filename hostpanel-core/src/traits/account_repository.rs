//! Hosting account persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{HostingAccount, HostingStatus};

/// Hosting account store.
///
/// Rows are never physically removed; deletion is `status = DELETED`.
///
/// Platform implementation:
/// - `SqliteHostingAccountRepository` (`SeaORM`) in `hostpanel-app`
#[async_trait]
pub trait HostingAccountRepository: Send + Sync {
    /// Get an account by ID, including deleted ones.
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<HostingAccount>>;

    /// Non-deleted accounts of one owner, oldest first.
    async fn find_by_owner(&self, owner_id: &str) -> CoreResult<Vec<HostingAccount>>;

    /// Accounts currently in any of `statuses`.
    async fn find_by_statuses(&self, statuses: &[HostingStatus])
    -> CoreResult<Vec<HostingAccount>>;

    /// Whether a non-deleted account already uses `domain` (case-insensitive).
    async fn domain_in_use(&self, domain: &str) -> CoreResult<bool>;

    /// Number of non-deleted accounts held by `owner_id`.
    async fn count_active_by_owner(&self, owner_id: &str) -> CoreResult<usize>;

    /// Insert a new account after re-checking domain uniqueness and the owner
    /// quota, atomically with the insert.
    ///
    /// # Errors
    /// - [`CoreError::DomainTaken`](crate::CoreError::DomainTaken)
    /// - [`CoreError::AccountLimitReached`](crate::CoreError::AccountLimitReached)
    async fn insert_checked(&self, account: &HostingAccount, max_per_owner: usize)
    -> CoreResult<()>;

    /// Overwrite the stored row, but only while its status is still `expected`.
    ///
    /// # Errors
    /// - [`CoreError::ConcurrentModification`](crate::CoreError::ConcurrentModification)
    ///   when the stored status differs
    /// - [`CoreError::AccountNotFound`](crate::CoreError::AccountNotFound)
    async fn update_if_status(
        &self,
        account: &HostingAccount,
        expected: HostingStatus,
    ) -> CoreResult<()>;
}
