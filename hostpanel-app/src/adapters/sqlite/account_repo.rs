//! `HostingAccountRepository` implementation for `SqliteHostingAccountRepository`.

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait,
};

use hostpanel_core::crypto;
use hostpanel_core::error::{CoreError, CoreResult};
use hostpanel_core::traits::HostingAccountRepository;
use hostpanel_core::types::{
    AccountPassword, HostingAccount, HostingStatus, InternalUsername, ProviderUsername,
};
use hostpanel_core::utils::datetime::{format_timestamp, parse_timestamp};

use super::SqliteHostingAccountRepository;
use super::entity::hosting_account::{self, Column, Entity};

fn storage_error(action: &'static str) -> impl FnOnce(DbErr) -> CoreError {
    move |e| CoreError::StorageError(format!("Failed to {action}: {e}"))
}

fn to_count(n: u64) -> CoreResult<usize> {
    usize::try_from(n).map_err(|e| CoreError::StorageError(format!("Row count overflow: {e}")))
}

impl SqliteHostingAccountRepository {
    fn seal_password(&self, password: &AccountPassword) -> CoreResult<String> {
        match &self.storage_secret {
            Some(secret) => crypto::seal(password.expose(), secret),
            None => Ok(password.expose().to_string()),
        }
    }

    fn open_password(&self, stored: String) -> CoreResult<AccountPassword> {
        if !crypto::is_sealed(&stored) {
            return Ok(AccountPassword::new(stored));
        }
        let secret = self.storage_secret.as_deref().ok_or_else(|| {
            CoreError::StorageError(
                "Stored password is sealed but no storage secret is configured".to_string(),
            )
        })?;
        crypto::open(&stored, secret).map(AccountPassword::new)
    }

    /// Convert a `SeaORM` row into a domain `HostingAccount`.
    fn row_to_account(&self, row: hosting_account::Model) -> CoreResult<HostingAccount> {
        let parse_opt = |raw: Option<String>| raw.as_deref().map(parse_timestamp).transpose();

        Ok(HostingAccount {
            password: self.open_password(row.password)?,
            status: row.status.parse()?,
            suspended_at: parse_opt(row.suspended_at)?,
            transition_started_at: parse_opt(row.transition_started_at)?,
            cpanel_approved_at: parse_opt(row.cpanel_approved_at)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            owner_id: row.owner_id,
            internal_username: InternalUsername::new(row.internal_username),
            provider_username: ProviderUsername::new(row.provider_username),
            domain: row.domain,
            is_custom_domain: row.is_custom_domain,
            label: row.label,
            suspension_reason: row.suspension_reason,
            cpanel_approved: row.cpanel_approved,
        })
    }

    fn rows_to_accounts(&self, rows: Vec<hosting_account::Model>) -> CoreResult<Vec<HostingAccount>> {
        rows.into_iter().map(|row| self.row_to_account(row)).collect()
    }

    /// Convert a domain `HostingAccount` into a fully-set active model.
    fn to_active_model(&self, account: &HostingAccount) -> CoreResult<hosting_account::ActiveModel> {
        let format_opt = |dt: Option<&chrono::DateTime<chrono::Utc>>| dt.map(format_timestamp);

        Ok(hosting_account::ActiveModel {
            id: Set(account.id.clone()),
            owner_id: Set(account.owner_id.clone()),
            internal_username: Set(account.internal_username.as_str().to_string()),
            provider_username: Set(account.provider_username.as_str().to_string()),
            domain: Set(account.domain.clone()),
            domain_key: Set(account.domain.to_ascii_lowercase()),
            is_custom_domain: Set(account.is_custom_domain),
            label: Set(account.label.clone()),
            password: Set(self.seal_password(&account.password)?),
            status: Set(account.status.as_str().to_string()),
            suspension_reason: Set(account.suspension_reason.clone()),
            suspended_at: Set(format_opt(account.suspended_at.as_ref())),
            transition_started_at: Set(format_opt(account.transition_started_at.as_ref())),
            cpanel_approved: Set(account.cpanel_approved),
            cpanel_approved_at: Set(format_opt(account.cpanel_approved_at.as_ref())),
            created_at: Set(format_timestamp(&account.created_at)),
            updated_at: Set(format_timestamp(&account.updated_at)),
        })
    }
}

/// Rows that still occupy a domain slot and count against the owner quota.
fn live() -> impl IntoCondition {
    Column::Status.ne(HostingStatus::Deleted.as_str())
}

#[async_trait]
impl HostingAccountRepository for SqliteHostingAccountRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<HostingAccount>> {
        let row = Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(storage_error("query account"))?;

        row.map(|row| self.row_to_account(row)).transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> CoreResult<Vec<HostingAccount>> {
        let rows = Entity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(live())
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error("query accounts by owner"))?;

        self.rows_to_accounts(rows)
    }

    async fn find_by_statuses(
        &self,
        statuses: &[HostingStatus],
    ) -> CoreResult<Vec<HostingAccount>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let rows = Entity::find()
            .filter(Column::Status.is_in(statuses.iter().map(|s| s.as_str())))
            .order_by_asc(Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(storage_error("query accounts by status"))?;

        self.rows_to_accounts(rows)
    }

    async fn domain_in_use(&self, domain: &str) -> CoreResult<bool> {
        let count = Entity::find()
            .filter(Column::DomainKey.eq(domain.to_ascii_lowercase()))
            .filter(live())
            .count(&self.db)
            .await
            .map_err(storage_error("check domain usage"))?;

        Ok(count > 0)
    }

    async fn count_active_by_owner(&self, owner_id: &str) -> CoreResult<usize> {
        let count = Entity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(live())
            .count(&self.db)
            .await
            .map_err(storage_error("count accounts"))?;

        to_count(count)
    }

    async fn insert_checked(
        &self,
        account: &HostingAccount,
        max_per_owner: usize,
    ) -> CoreResult<()> {
        let active_model = self.to_active_model(account)?;

        // Dropping the transaction on an early return rolls it back.
        let txn = self
            .db
            .begin()
            .await
            .map_err(storage_error("begin transaction"))?;

        let taken = Entity::find()
            .filter(Column::DomainKey.eq(account.domain.to_ascii_lowercase()))
            .filter(live())
            .count(&txn)
            .await
            .map_err(storage_error("check domain usage"))?;
        if taken > 0 {
            return Err(CoreError::DomainTaken(account.domain.clone()));
        }

        let held = Entity::find()
            .filter(Column::OwnerId.eq(account.owner_id.as_str()))
            .filter(live())
            .count(&txn)
            .await
            .map_err(storage_error("count accounts"))?;
        if to_count(held)? >= max_per_owner {
            return Err(CoreError::AccountLimitReached(max_per_owner));
        }

        Entity::insert(active_model)
            .exec(&txn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    CoreError::DomainTaken(account.domain.clone())
                }
                _ => CoreError::StorageError(format!("Failed to insert account: {e}")),
            })?;

        txn.commit()
            .await
            .map_err(storage_error("commit account insert"))?;

        Ok(())
    }

    async fn update_if_status(
        &self,
        account: &HostingAccount,
        expected: HostingStatus,
    ) -> CoreResult<()> {
        let mut active_model = self.to_active_model(account)?;
        active_model.id = NotSet;

        let result = Entity::update_many()
            .set(active_model)
            .filter(Column::Id.eq(account.id.as_str()))
            .filter(Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(storage_error("update account"))?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        let exists = Entity::find_by_id(account.id.as_str())
            .one(&self.db)
            .await
            .map_err(storage_error("query account"))?
            .is_some();
        Err(if exists {
            CoreError::ConcurrentModification(account.id.clone())
        } else {
            CoreError::AccountNotFound(account.id.clone())
        })
    }
}
