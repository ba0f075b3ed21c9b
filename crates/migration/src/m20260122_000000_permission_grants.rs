//! Adds persisted permission overrides and their audit trail.
//!
//! - `role_grants`: per-role allow/deny overrides on top of the compiled-in
//!   default grant table
//! - `permission_audit`: append-only log of every change (who, what, when)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum RoleGrants {
    Table,
    Role,
    Permission,
    Allowed,
}

#[derive(Iden)]
enum PermissionAudit {
    Table,
    Id,
    Role,
    Permission,
    Allowed,
    ChangedBy,
    ChangedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleGrants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoleGrants::Role).string().not_null())
                    .col(ColumnDef::new(RoleGrants::Permission).string().not_null())
                    .col(ColumnDef::new(RoleGrants::Allowed).boolean().not_null())
                    .primary_key(
                        Index::create()
                            .col(RoleGrants::Role)
                            .col(RoleGrants::Permission),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PermissionAudit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PermissionAudit::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PermissionAudit::Role).string().not_null())
                    .col(
                        ColumnDef::new(PermissionAudit::Permission)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PermissionAudit::Allowed).boolean().not_null())
                    .col(
                        ColumnDef::new(PermissionAudit::ChangedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PermissionAudit::ChangedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-permission_audit-role")
                    .table(PermissionAudit::Table)
                    .col(PermissionAudit::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PermissionAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleGrants::Table).to_owned())
            .await?;
        Ok(())
    }
}
