//! SQLite-backed hosting account store using `SeaORM`.
//!
//! `SqliteHostingAccountRepository` implements `HostingAccountRepository`
//! against a single local `SQLite` database. Account passwords are sealed with
//! AES-256-GCM when a storage secret is provided at construction.

mod account_repo;
pub(crate) mod entity;
mod migration;

use std::path::Path;

use hostpanel_core::error::{CoreError, CoreResult};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use migration::Migrator;

/// `SQLite` implementation of `HostingAccountRepository`.
///
/// If `storage_secret` is `None`, passwords are stored as plaintext. Rows
/// sealed under a secret can only be read back with that secret.
pub struct SqliteHostingAccountRepository {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
    /// Secret used to seal and open stored account passwords.
    pub(crate) storage_secret: Option<String>,
}

impl SqliteHostingAccountRepository {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path, storage_secret: Option<String>) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to SQLite: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        log::info!(
            "Hosting account store ready at {} (password sealing {})",
            db_path.display(),
            if storage_secret.is_some() { "on" } else { "off" }
        );

        Ok(Self { db, storage_secret })
    }
}
