use sea_orm_migration::prelude::*;

use super::m20261016_000001_users_and_follows::Users;
use super::m20261016_000002_organizations::Organizations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Events::OrganizationId).string().not_null())
                    .col(ColumnDef::new(Events::Creator).string().not_null())
                    .col(ColumnDef::new(Events::Title).string_len(120).not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Events::StartsAt).big_integer().not_null())
                    .col(ColumnDef::new(Events::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_organization_id")
                            .from(Events::Table, Events::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_creator")
                            .from(Events::Table, Events::Creator)
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
                    .name("idx_events_organization_id")
                    .table(Events::Table)
                    .col(Events::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventAttendance::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventAttendance::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EventAttendance::EventId).string().not_null())
                    .col(ColumnDef::new(EventAttendance::Username).string().not_null())
                    .col(
                        ColumnDef::new(EventAttendance::Rsvp)
                            .string_len(1)
                            .not_null()
                            .default("M"),
                    )
                    .col(ColumnDef::new(EventAttendance::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(EventAttendance::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_attendance_event_id")
                            .from(EventAttendance::Table, EventAttendance::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_attendance_username")
                            .from(EventAttendance::Table, EventAttendance::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one answer per member per event.
        manager
            .create_index(
                Index::create()
                    .name("uq_event_attendance_event_user")
                    .table(EventAttendance::Table)
                    .col(EventAttendance::EventId)
                    .col(EventAttendance::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventAttendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    OrganizationId,
    Creator,
    Title,
    Description,
    StartsAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EventAttendance {
    Table,
    Id,
    EventId,
    Username,
    Rsvp,
    CreatedAt,
    UpdatedAt,
}
