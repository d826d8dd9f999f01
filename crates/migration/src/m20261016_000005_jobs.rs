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
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::Creator).string().not_null())
                    .col(ColumnDef::new(Jobs::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Jobs::Description).text().not_null())
                    .col(ColumnDef::new(Jobs::Pay).string_len(100).not_null())
                    .col(ColumnDef::new(Jobs::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_creator")
                            .from(Jobs::Table, Jobs::Creator)
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
                    .name("idx_jobs_creator")
                    .table(Jobs::Table)
                    .col(Jobs::Creator)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobApplications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JobApplications::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(JobApplications::JobId).string().not_null())
                    .col(ColumnDef::new(JobApplications::Applicant).string().not_null())
                    .col(ColumnDef::new(JobApplications::ApplicantName).string_len(100).not_null())
                    .col(ColumnDef::new(JobApplications::ApplicantEmail).string().not_null())
                    .col(ColumnDef::new(JobApplications::ApplicantPhone).string_len(20).not_null())
                    .col(ColumnDef::new(JobApplications::RequestedPay).string_len(100))
                    .col(ColumnDef::new(JobApplications::ResumeText).text().not_null())
                    .col(ColumnDef::new(JobApplications::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_applications_job_id")
                            .from(JobApplications::Table, JobApplications::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_applications_applicant")
                            .from(JobApplications::Table, JobApplications::Applicant)
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
                    .name("idx_job_applications_job_id")
                    .table(JobApplications::Table)
                    .col(JobApplications::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobApplications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    Creator,
    Title,
    Description,
    Pay,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JobApplications {
    Table,
    Id,
    JobId,
    Applicant,
    ApplicantName,
    ApplicantEmail,
    ApplicantPhone,
    RequestedPay,
    ResumeText,
    CreatedAt,
}
