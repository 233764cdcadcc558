use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Only one live account per domain; deleted rows keep their history.
const UNIQUE_LIVE_DOMAIN: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     idx_hosting_accounts_live_domain ON hosting_accounts (domain_key) \
     WHERE status <> 'DELETED'";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HostingAccount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HostingAccount::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HostingAccount::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(HostingAccount::InternalUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HostingAccount::ProviderUsername)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HostingAccount::Domain).string().not_null())
                    .col(ColumnDef::new(HostingAccount::DomainKey).string().not_null())
                    .col(
                        ColumnDef::new(HostingAccount::IsCustomDomain)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(HostingAccount::Label).string().null())
                    .col(ColumnDef::new(HostingAccount::Password).string().not_null())
                    .col(ColumnDef::new(HostingAccount::Status).string().not_null())
                    .col(
                        ColumnDef::new(HostingAccount::SuspensionReason)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(HostingAccount::SuspendedAt).string().null())
                    .col(
                        ColumnDef::new(HostingAccount::TransitionStartedAt)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HostingAccount::CpanelApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(HostingAccount::CpanelApprovedAt)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(HostingAccount::CreatedAt).string().not_null())
                    .col(ColumnDef::new(HostingAccount::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_hosting_accounts_owner")
                    .table(HostingAccount::Table)
                    .col(HostingAccount::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_hosting_accounts_status")
                    .table(HostingAccount::Table)
                    .col(HostingAccount::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(UNIQUE_LIVE_DOMAIN)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HostingAccount::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum HostingAccount {
    #[sea_orm(iden = "hosting_accounts")]
    Table,
    Id,
    OwnerId,
    InternalUsername,
    ProviderUsername,
    Domain,
    DomainKey,
    IsCustomDomain,
    Label,
    Password,
    Status,
    SuspensionReason,
    SuspendedAt,
    TransitionStartedAt,
    CpanelApproved,
    CpanelApprovedAt,
    CreatedAt,
    UpdatedAt,
}
