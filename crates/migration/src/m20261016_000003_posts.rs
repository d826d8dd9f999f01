use sea_orm_migration::prelude::*;

use super::m20261016_000001_users_and_follows::Users;
use super::m20261016_000002_organizations::Organizations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Personal posts.
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Author).string().not_null())
                    .col(ColumnDef::new(Posts::Description).string_len(800).not_null())
                    .col(ColumnDef::new(Posts::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author")
                            .from(Posts::Table, Posts::Author)
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
                    .name("idx_posts_author_created_at")
                    .table(Posts::Table)
                    .col(Posts::Author)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLikes::PostId).string().not_null())
                    .col(ColumnDef::new(PostLikes::Username).string().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_post_likes")
                            .col(PostLikes::PostId)
                            .col(PostLikes::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_likes_post_id")
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_likes_username")
                            .from(PostLikes::Table, PostLikes::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Organization posts.
        manager
            .create_table(
                Table::create()
                    .table(OrganizationPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrganizationPosts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(OrganizationPosts::OrganizationId).string().not_null())
                    .col(ColumnDef::new(OrganizationPosts::Author).string().not_null())
                    .col(ColumnDef::new(OrganizationPosts::Description).string_len(800).not_null())
                    .col(ColumnDef::new(OrganizationPosts::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_posts_organization_id")
                            .from(OrganizationPosts::Table, OrganizationPosts::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_posts_author")
                            .from(OrganizationPosts::Table, OrganizationPosts::Author)
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
                    .name("idx_organization_posts_organization_id")
                    .table(OrganizationPosts::Table)
                    .col(OrganizationPosts::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationPostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrganizationPostLikes::PostId).string().not_null())
                    .col(ColumnDef::new(OrganizationPostLikes::Username).string().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_organization_post_likes")
                            .col(OrganizationPostLikes::PostId)
                            .col(OrganizationPostLikes::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_post_likes_post_id")
                            .from(OrganizationPostLikes::Table, OrganizationPostLikes::PostId)
                            .to(OrganizationPosts::Table, OrganizationPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_post_likes_username")
                            .from(OrganizationPostLikes::Table, OrganizationPostLikes::Username)
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
            .drop_table(Table::drop().table(OrganizationPostLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationPosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Author,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PostLikes {
    Table,
    PostId,
    Username,
}

#[derive(DeriveIden)]
enum OrganizationPosts {
    Table,
    Id,
    OrganizationId,
    Author,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrganizationPostLikes {
    Table,
    PostId,
    Username,
}
