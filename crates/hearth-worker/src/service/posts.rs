use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use entity::{post, post::Entity as PostEntity, post_like, post_like::Entity as PostLikeEntity};

use crate::error::{ServiceError, ServiceResult};
use crate::pagination::{page_offset, Page, PAGE_SIZE};
use crate::service::accounts::find_user;
use crate::service::validate;
use crate::util::{now_ts, ts_to_display_date, ts_to_rfc3339, uuid_v4};

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: String,
    pub username: String,
    pub description: String,
    pub formatted_date: String,
    pub created_at: String,
    pub likes: Vec<String>,
    pub like_count: usize,
    /// Whether the requesting user is in `likes`.
    pub liked: bool,
}

impl PostView {
    fn build(post: post::Model, likes: Vec<String>, viewer: &str) -> Self {
        Self {
            liked: likes.iter().any(|u| u == viewer),
            like_count: likes.len(),
            id: post.id,
            username: post.author,
            description: post.description,
            formatted_date: ts_to_display_date(post.created_at),
            created_at: ts_to_rfc3339(post.created_at),
            likes,
        }
    }
}

async fn likes_for<C: ConnectionTrait>(db: &C, post_ids: Vec<String>) -> ServiceResult<HashMap<String, Vec<String>>> {
    let mut by_post: HashMap<String, Vec<String>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(by_post);
    }

    let likes = PostLikeEntity::find()
        .filter(post_like::Column::PostId.is_in(post_ids))
        .order_by_asc(post_like::Column::Username)
        .all(db)
        .await?;
    for like in likes {
        by_post.entry(like.post_id).or_default().push(like.username);
    }
    Ok(by_post)
}

async fn views<C: ConnectionTrait>(db: &C, posts: Vec<post::Model>, viewer: &str) -> ServiceResult<Vec<PostView>> {
    let mut likes = likes_for(db, posts.iter().map(|p| p.id.clone()).collect()).await?;
    Ok(posts
        .into_iter()
        .map(|p| {
            let post_likes = likes.remove(&p.id).unwrap_or_default();
            PostView::build(p, post_likes, viewer)
        })
        .collect())
}

pub async fn create_post(db: &DatabaseConnection, author: &str, description: &str) -> ServiceResult<PostView> {
    let description = validate::required("description", description, validate::POST_MAX)?;
    find_user(db, author).await?;

    let post = post::ActiveModel {
        id: Set(uuid_v4()),
        author: Set(author.to_string()),
        description: Set(description),
        created_at: Set(now_ts()),
    }
    .insert(db)
    .await?;

    Ok(PostView::build(post, Vec::new(), author))
}

/// Posts written by `username`, newest first.
pub async fn user_posts(db: &DatabaseConnection, viewer: &str, username: &str) -> ServiceResult<Vec<PostView>> {
    find_user(db, username).await?;

    let posts = PostEntity::find()
        .filter(post::Column::Author.eq(username))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await?;
    views(db, posts, viewer).await
}

/// Every personal post, newest first, ten per page.
pub async fn feed(db: &DatabaseConnection, viewer: &str, page: u64) -> ServiceResult<Page<PostView>> {
    let count = PostEntity::find().count(db).await?;
    let offset = page_offset(page, count)?;

    let posts = PostEntity::find()
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .offset(offset)
        .limit(PAGE_SIZE)
        .all(db)
        .await?;

    Ok(Page::new(page, count, views(db, posts, viewer).await?))
}

/// Flip `actor`'s like on a post. Returns whether the post is now liked.
pub async fn toggle_like(db: &DatabaseConnection, actor: &str, post_id: &str) -> ServiceResult<bool> {
    let txn = db.begin().await?;

    PostEntity::find_by_id(post_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("post does not exist"))?;

    let existing = PostLikeEntity::find_by_id((post_id.to_string(), actor.to_string()))
        .one(&txn)
        .await?;

    let now_liked = match existing {
        Some(like) => {
            like.delete(&txn).await?;
            false
        }
        None => {
            post_like::ActiveModel {
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
    use crate::testing::{seed_user, test_db};

    #[tokio::test]
    async fn like_toggle_is_an_involution() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;
        let post = create_post(&db, "alice", "hello").await.unwrap();

        assert!(toggle_like(&db, "bob", &post.id).await.unwrap());
        let liked = user_posts(&db, "bob", "alice").await.unwrap();
        assert_eq!(liked[0].likes, vec!["bob"]);
        assert!(liked[0].liked);

        assert!(!toggle_like(&db, "bob", &post.id).await.unwrap());
        let restored = user_posts(&db, "bob", "alice").await.unwrap();
        assert_eq!(restored[0].like_count, 0);
        assert!(!restored[0].liked);
    }

    #[tokio::test]
    async fn liking_missing_post_is_not_found() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        assert!(matches!(
            toggle_like(&db, "alice", "nope").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_post_is_rejected() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        assert!(matches!(
            create_post(&db, "alice", "   ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn feed_pages_by_ten() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        for i in 0..12 {
            create_post(&db, "alice", &format!("post {i}")).await.unwrap();
        }

        let first = feed(&db, "alice", 1).await.unwrap();
        assert_eq!(first.count, 12);
        assert_eq!(first.results.len(), 10);
        assert_eq!(first.next, Some(2));
        assert_eq!(first.previous, None);

        let second = feed(&db, "alice", 2).await.unwrap();
        assert_eq!(second.results.len(), 2);
        assert_eq!(second.next, None);

        assert!(matches!(feed(&db, "alice", 3).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn user_posts_require_existing_user() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        assert!(user_posts(&db, "alice", "alice").await.unwrap().is_empty());
        assert!(matches!(
            user_posts(&db, "alice", "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
