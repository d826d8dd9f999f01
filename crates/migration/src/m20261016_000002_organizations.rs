use sea_orm_migration::prelude::*;

use super::m20261016_000001_users_and_follows::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organizations::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Organizations::Name)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Organizations::Bio).string_len(800).not_null().default(""))
                    .col(ColumnDef::new(Organizations::ProfileImage).string())
                    .col(ColumnDef::new(Organizations::Owner).string().not_null())
                    .col(ColumnDef::new(Organizations::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Organizations::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organizations_owner")
                            .from(Organizations::Table, Organizations::Owner)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrganizationMembers::OrganizationId).string().not_null())
                    .col(ColumnDef::new(OrganizationMembers::Username).string().not_null())
                    .col(ColumnDef::new(OrganizationMembers::JoinedAt).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_organization_members")
                            .col(OrganizationMembers::OrganizationId)
                            .col(OrganizationMembers::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_members_organization_id")
                            .from(OrganizationMembers::Table, OrganizationMembers::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_members_username")
                            .from(OrganizationMembers::Table, OrganizationMembers::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organization_members_username")
                    .table(OrganizationMembers::Table)
                    .col(OrganizationMembers::Username)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationJoinRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrganizationJoinRequests::OrganizationId).string().not_null())
                    .col(ColumnDef::new(OrganizationJoinRequests::Username).string().not_null())
                    .col(ColumnDef::new(OrganizationJoinRequests::RequestedAt).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_organization_join_requests")
                            .col(OrganizationJoinRequests::OrganizationId)
                            .col(OrganizationJoinRequests::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_join_requests_organization_id")
                            .from(OrganizationJoinRequests::Table, OrganizationJoinRequests::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_join_requests_username")
                            .from(OrganizationJoinRequests::Table, OrganizationJoinRequests::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganizationJoinRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Organizations {
    Table,
    Id,
    Name,
    Bio,
    ProfileImage,
    Owner,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganizationMembers {
    Table,
    OrganizationId,
    Username,
    JoinedAt,
}

#[derive(DeriveIden)]
enum OrganizationJoinRequests {
    Table,
    OrganizationId,
    Username,
    RequestedAt,
}
