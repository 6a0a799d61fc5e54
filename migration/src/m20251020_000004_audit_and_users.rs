use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    EntityName,
    EntityId,
    TableName,
    PrimaryKey,
    Action,
    UserId,
    UserName,
    Timestamp,
    OldValues,
    NewValues,
    Description,
    IpAddress,
    UserAgent,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    TenantId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::EntityName).string_len(64).not_null())
                    .col(ColumnDef::new(AuditLogs::EntityId).integer())
                    .col(ColumnDef::new(AuditLogs::TableName).string_len(64).not_null())
                    .col(ColumnDef::new(AuditLogs::PrimaryKey).string_len(64).not_null())
                    .col(ColumnDef::new(AuditLogs::Action).string_len(32).not_null())
                    .col(ColumnDef::new(AuditLogs::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(AuditLogs::UserName).string_len(128))
                    .col(
                        ColumnDef::new(AuditLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditLogs::OldValues).text())
                    .col(ColumnDef::new(AuditLogs::NewValues).text())
                    .col(ColumnDef::new(AuditLogs::Description).string_len(512))
                    .col(ColumnDef::new(AuditLogs::IpAddress).string_len(64))
                    .col(ColumnDef::new(AuditLogs::UserAgent).string_len(512))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_logs_timestamp")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_logs_entity")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::TableName)
                    .col(AuditLogs::PrimaryKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(32)
                            .not_null()
                            .default("User"),
                    )
                    .col(
                        ColumnDef::new(Users::TenantId)
                            .string_len(64)
                            .not_null()
                            .default("default"),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).if_exists().to_owned())
            .await
    }
}
