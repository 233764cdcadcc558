//! `SeaORM` entity for the `hosting_accounts` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hosting_accounts")]
/// Database row model for a hosting account.
///
/// Timestamps are RFC 3339 strings in UTC with millisecond precision, so they
/// sort lexicographically.
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub internal_username: String,
    pub provider_username: String,
    pub domain: String,
    /// Lowercased `domain`, the key for uniqueness checks.
    pub domain_key: String,
    pub is_custom_domain: bool,
    pub label: Option<String>,
    /// Plaintext, or a sealed `v1:...` value when a storage secret is configured.
    pub password: String,
    pub status: String,
    pub suspension_reason: Option<String>,
    pub suspended_at: Option<String>,
    pub transition_started_at: Option<String>,
    pub cpanel_approved: bool,
    pub cpanel_approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
