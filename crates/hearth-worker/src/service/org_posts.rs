use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use entity::{
    org_post, org_post::Entity as OrgPostEntity, org_post_like,
    org_post_like::Entity as OrgPostLikeEntity,
};

use crate::error::{ServiceError, ServiceResult};
use crate::service::organizations::{membership_ids, require_member};
use crate::service::validate;
use crate::util::{now_ts, ts_to_display_date, ts_to_rfc3339, uuid_v4};

#[derive(Debug, Serialize)]
pub struct OrgPostView {
    pub id: String,
    pub organization: String,
    pub username: String,
    pub description: String,
    pub formatted_date: String,
    pub created_at: String,
    pub likes: Vec<String>,
    pub like_count: usize,
    pub liked: bool,
}

async fn views<C: ConnectionTrait>(
    db: &C,
    posts: Vec<org_post::Model>,
    viewer: &str,
) -> ServiceResult<Vec<OrgPostView>> {
    let mut likes: HashMap<String, Vec<String>> = HashMap::new();
    if !posts.is_empty() {
        let rows = OrgPostLikeEntity::find()
            .filter(org_post_like::Column::PostId.is_in(posts.iter().map(|p| p.id.clone())))
            .order_by_asc(org_post_like::Column::Username)
            .all(db)
            .await?;
        for row in rows {
            likes.entry(row.post_id).or_default().push(row.username);
        }
    }

    Ok(posts
        .into_iter()
        .map(|p| {
            let post_likes = likes.remove(&p.id).unwrap_or_default();
            OrgPostView {
                liked: post_likes.iter().any(|u| u == viewer),
                like_count: post_likes.len(),
                id: p.id,
                organization: p.organization_id,
                username: p.author,
                description: p.description,
                formatted_date: ts_to_display_date(p.created_at),
                created_at: ts_to_rfc3339(p.created_at),
                likes: post_likes,
            }
        })
        .collect())
}

/// Post into an organization. Members only.
pub async fn create_org_post(
    db: &DatabaseConnection,
    actor: &str,
    org_id: &str,
    description: &str,
) -> ServiceResult<OrgPostView> {
    let description = validate::required("description", description, validate::POST_MAX)?;
    require_member(db, org_id, actor).await?;

    let post = org_post::ActiveModel {
        id: Set(uuid_v4()),
        organization_id: Set(org_id.to_string()),
        author: Set(actor.to_string()),
        description: Set(description),
        created_at: Set(now_ts()),
    }
    .insert(db)
    .await?;

    let mut out = views(db, vec![post], actor).await?;
    out.pop()
        .ok_or_else(|| ServiceError::not_found("post does not exist"))
}

/// Posts of one organization, newest first. Members only.
pub async fn org_posts(db: &DatabaseConnection, actor: &str, org_id: &str) -> ServiceResult<Vec<OrgPostView>> {
    require_member(db, org_id, actor).await?;

    let posts = OrgPostEntity::find()
        .filter(org_post::Column::OrganizationId.eq(org_id))
        .order_by_desc(org_post::Column::CreatedAt)
        .order_by_desc(org_post::Column::Id)
        .all(db)
        .await?;
    views(db, posts, actor).await
}

/// Posts from every organization `actor` belongs to, newest first.
pub async fn org_feed(db: &DatabaseConnection, actor: &str) -> ServiceResult<Vec<OrgPostView>> {
    let ids = membership_ids(db, actor).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let posts = OrgPostEntity::find()
        .filter(org_post::Column::OrganizationId.is_in(ids))
        .order_by_desc(org_post::Column::CreatedAt)
        .order_by_desc(org_post::Column::Id)
        .all(db)
        .await?;
    views(db, posts, actor).await
}

/// Flip `actor`'s like on an organization post. Members of that organization only.
pub async fn toggle_org_post_like(db: &DatabaseConnection, actor: &str, post_id: &str) -> ServiceResult<bool> {
    let txn = db.begin().await?;

    let post = OrgPostEntity::find_by_id(post_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("post does not exist"))?;
    require_member(&txn, &post.organization_id, actor).await?;

    let existing = OrgPostLikeEntity::find_by_id((post_id.to_string(), actor.to_string()))
        .one(&txn)
        .await?;
    let now_liked = match existing {
        Some(like) => {
            like.delete(&txn).await?;
            false
        }
        None => {
            org_post_like::ActiveModel {
                post_id: Set(post_id.to_string()),
                username: Set(actor.to_string()),
            }
            .insert(&txn)
            .await?;
            true
        }
    };

    txn.commit().await?;
    Ok(now_liked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::organizations::{self, NewOrganization};
    use crate::testing::{seed_user, test_db};

    async fn setup(db: &DatabaseConnection) -> String {
        for name in ["alice", "bob", "carol"] {
            seed_user(db, name).await;
        }
        let org = organizations::create(
            db,
            "alice",
            NewOrganization {
                name: "Acme".to_string(),
                bio: String::new(),
                profile_image: None,
            },
        )
        .await
        .unwrap();
        organizations::request_to_join(db, "bob", &org.id).await.unwrap();
        organizations::accept_join_request(db, "alice", &org.id, "bob").await.unwrap();
        org.id
    }

    #[tokio::test]
    async fn non_members_cannot_read_or_write() {
        let db = test_db().await;
        let org_id = setup(&db).await;

        assert!(matches!(
            org_posts(&db, "carol", &org_id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            create_org_post(&db, "carol", &org_id, "hi").await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            org_posts(&db, "carol", "missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn members_post_and_like() {
        let db = test_db().await;
        let org_id = setup(&db).await;

        let post = create_org_post(&db, "bob", &org_id, "quarterly update").await.unwrap();
        assert_eq!(post.organization, org_id);
        assert_eq!(post.username, "bob");

        assert!(toggle_org_post_like(&db, "alice", &post.id).await.unwrap());
        assert!(matches!(
            toggle_org_post_like(&db, "carol", &post.id).await,
            Err(ServiceError::Forbidden(_))
        ));

        let posts = org_posts(&db, "alice", &org_id).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].likes, vec!["alice"]);
        assert!(posts[0].liked);

        assert!(!toggle_org_post_like(&db, "alice", &post.id).await.unwrap());
    }

    #[tokio::test]
    async fn feed_covers_memberships_only() {
        let db = test_db().await;
        let org_id = setup(&db).await;
        create_org_post(&db, "alice", &org_id, "welcome").await.unwrap();

        assert_eq!(org_feed(&db, "bob").await.unwrap().len(), 1);
        assert!(org_feed(&db, "carol").await.unwrap().is_empty());
    }
}
