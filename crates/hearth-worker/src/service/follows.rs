use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};

use entity::{follow, follow::Entity as FollowEntity};

use crate::error::{ServiceError, ServiceResult};
use crate::service::accounts::find_user;
use crate::util::now_ts;

pub async fn follower_count<C: ConnectionTrait>(db: &C, username: &str) -> ServiceResult<u64> {
    Ok(FollowEntity::find()
        .filter(follow::Column::Followee.eq(username))
        .count(db)
        .await?)
}

pub async fn following_count<C: ConnectionTrait>(db: &C, username: &str) -> ServiceResult<u64> {
    Ok(FollowEntity::find()
        .filter(follow::Column::Follower.eq(username))
        .count(db)
        .await?)
}

pub async fn is_following<C: ConnectionTrait>(db: &C, follower: &str, followee: &str) -> ServiceResult<bool> {
    let edge = FollowEntity::find_by_id((follower.to_string(), followee.to_string()))
        .one(db)
        .await?;
    Ok(edge.is_some())
}

/// Flip the `actor -> target` edge. Returns whether `actor` now follows `target`.
pub async fn toggle_follow(db: &DatabaseConnection, actor: &str, target: &str) -> ServiceResult<bool> {
    if actor == target {
        return Err(ServiceError::validation("You cannot follow yourself."));
    }

    let txn = db.begin().await?;
    find_user(&txn, target).await?;

    let existing = FollowEntity::find_by_id((actor.to_string(), target.to_string()))
        .one(&txn)
        .await?;

    let now_following = match existing {
        Some(edge) => {
            edge.delete(&txn).await?;
            false
        }
        None => {
            follow::ActiveModel {
                follower: Set(actor.to_string()),
                followee: Set(target.to_string()),
                created_at: Set(now_ts()),
            }
            .insert(&txn)
            .await?;
            true
        }
    };

    txn.commit().await?;
    tracing::debug!(actor, target, now_following, "toggled follow");
    Ok(now_following)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, test_db};

    #[tokio::test]
    async fn follow_edges_are_directed() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        assert!(toggle_follow(&db, "alice", "bob").await.unwrap());
        assert!(is_following(&db, "alice", "bob").await.unwrap());
        assert!(!is_following(&db, "bob", "alice").await.unwrap());
        assert_eq!(follower_count(&db, "bob").await.unwrap(), 1);
        assert_eq!(following_count(&db, "bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        assert!(toggle_follow(&db, "alice", "bob").await.unwrap());
        assert!(!toggle_follow(&db, "alice", "bob").await.unwrap());
        assert_eq!(follower_count(&db, "bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_self_and_unknown_targets() {
        let db = test_db().await;
        seed_user(&db, "alice").await;

        assert!(matches!(
            toggle_follow(&db, "alice", "alice").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            toggle_follow(&db, "alice", "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
