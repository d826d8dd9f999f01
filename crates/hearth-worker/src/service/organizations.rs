//! Organizations and their membership state machine.
//!
//! Per (organization, user) the states are unrelated, pending and member; the owner is
//! always also a member. A request moves unrelated to pending, the owner's accept moves
//! pending to member in one transaction, and removal moves member back to unrelated.
//! There is no reject transition.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use entity::{
    join_request, join_request::Entity as JoinRequestEntity, organization,
    organization::Entity as OrganizationEntity, organization_member,
    organization_member::Entity as MemberEntity,
};

use crate::error::{ServiceError, ServiceResult};
use crate::service::accounts::find_user;
use crate::service::validate;
use crate::util::{now_ts, ts_to_date, uuid_v4};

#[derive(Debug, Serialize)]
pub struct OrganizationView {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub created_at: String,
    pub owner_username: String,
    pub members: Vec<String>,
    pub pending_requests: Vec<String>,
    pub member_count: usize,
    pub is_owner: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrganizationUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

pub async fn find_organization<C: ConnectionTrait>(db: &C, org_id: &str) -> ServiceResult<organization::Model> {
    OrganizationEntity::find_by_id(org_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Organization not found"))
}

pub async fn is_member<C: ConnectionTrait>(db: &C, org_id: &str, username: &str) -> ServiceResult<bool> {
    let row = MemberEntity::find_by_id((org_id.to_string(), username.to_string()))
        .one(db)
        .await?;
    Ok(row.is_some())
}

/// Load the organization and fail with `Forbidden` unless `username` belongs to it.
pub async fn require_member<C: ConnectionTrait>(
    db: &C,
    org_id: &str,
    username: &str,
) -> ServiceResult<organization::Model> {
    let org = find_organization(db, org_id).await?;
    if !is_member(db, org_id, username).await? {
        return Err(ServiceError::forbidden("You are not a member of this organization"));
    }
    Ok(org)
}

/// Organization ids `username` belongs to.
pub async fn membership_ids<C: ConnectionTrait>(db: &C, username: &str) -> ServiceResult<Vec<String>> {
    let rows = MemberEntity::find()
        .filter(organization_member::Column::Username.eq(username))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|m| m.organization_id).collect())
}

async fn name_taken<C: ConnectionTrait>(db: &C, name: &str, except: Option<&str>) -> ServiceResult<bool> {
    let mut query = OrganizationEntity::find().filter(organization::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(organization::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

async fn view<C: ConnectionTrait>(db: &C, org: organization::Model, viewer: &str) -> ServiceResult<OrganizationView> {
    let members: Vec<String> = MemberEntity::find()
        .filter(organization_member::Column::OrganizationId.eq(org.id.as_str()))
        .order_by_asc(organization_member::Column::JoinedAt)
        .order_by_asc(organization_member::Column::Username)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.username)
        .collect();

    let pending_requests: Vec<String> = JoinRequestEntity::find()
        .filter(join_request::Column::OrganizationId.eq(org.id.as_str()))
        .order_by_asc(join_request::Column::RequestedAt)
        .order_by_asc(join_request::Column::Username)
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.username)
        .collect();

    Ok(OrganizationView {
        is_owner: org.owner == viewer,
        member_count: members.len(),
        id: org.id,
        name: org.name,
        bio: org.bio,
        profile_image: org.profile_image,
        created_at: ts_to_date(org.created_at),
        owner_username: org.owner,
        members,
        pending_requests,
    })
}

async fn views<C: ConnectionTrait>(
    db: &C,
    orgs: Vec<organization::Model>,
    viewer: &str,
) -> ServiceResult<Vec<OrganizationView>> {
    let mut out = Vec::with_capacity(orgs.len());
    for org in orgs {
        out.push(view(db, org, viewer).await?);
    }
    Ok(out)
}

/// Create an organization owned by `owner`, who becomes its first member.
pub async fn create(db: &DatabaseConnection, owner: &str, new: NewOrganization) -> ServiceResult<OrganizationView> {
    let name = validate::required("name", &new.name, validate::NAME_MAX)?;
    validate::at_most("bio", &new.bio, validate::BIO_MAX)?;
    let profile_image = validate::optional("profile_image", new.profile_image.as_deref(), 500)?;

    let txn = db.begin().await?;
    if name_taken(&txn, &name, None).await? {
        return Err(ServiceError::conflict("An organization with this name already exists."));
    }

    let now = now_ts();
    let org = organization::ActiveModel {
        id: Set(uuid_v4()),
        name: Set(name),
        bio: Set(new.bio),
        profile_image: Set(profile_image),
        owner: Set(owner.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    organization_member::ActiveModel {
        organization_id: Set(org.id.clone()),
        username: Set(owner.to_string()),
        joined_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let out = view(&txn, org, owner).await?;
    txn.commit().await?;
    tracing::debug!(org_id = %out.id, owner, "created organization");
    Ok(out)
}

pub async fn get(db: &DatabaseConnection, viewer: &str, org_id: &str) -> ServiceResult<OrganizationView> {
    let org = find_organization(db, org_id).await?;
    view(db, org, viewer).await
}

/// Owner-only partial update of name, bio and image.
pub async fn update(
    db: &DatabaseConnection,
    actor: &str,
    org_id: &str,
    update: OrganizationUpdate,
) -> ServiceResult<OrganizationView> {
    let txn = db.begin().await?;
    let org = find_organization(&txn, org_id).await?;
    if org.owner != actor {
        return Err(ServiceError::forbidden("Only the owner can update this organization"));
    }

    let mut active: organization::ActiveModel = org.into();
    if let Some(name) = update.name {
        let name = validate::required("name", &name, validate::NAME_MAX)?;
        if name_taken(&txn, &name, Some(org_id)).await? {
            return Err(ServiceError::conflict("An organization with this name already exists."));
        }
        active.name = Set(name);
    }
    if let Some(bio) = update.bio {
        validate::at_most("bio", &bio, validate::BIO_MAX)?;
        active.bio = Set(bio);
    }
    if let Some(image) = update.profile_image {
        active.profile_image = Set(validate::optional("profile_image", Some(&image), 500)?);
    }
    active.updated_at = Set(now_ts());

    let org = active.update(&txn).await?;
    let out = view(&txn, org, actor).await?;
    txn.commit().await?;
    Ok(out)
}

/// Unrelated -> pending.
pub async fn request_to_join(db: &DatabaseConnection, actor: &str, org_id: &str) -> ServiceResult<()> {
    let txn = db.begin().await?;
    find_organization(&txn, org_id).await?;

    if is_member(&txn, org_id, actor).await? {
        return Err(ServiceError::conflict("Already a member"));
    }
    let pending = JoinRequestEntity::find_by_id((org_id.to_string(), actor.to_string()))
        .one(&txn)
        .await?;
    if pending.is_some() {
        return Err(ServiceError::conflict("Already requested"));
    }

    join_request::ActiveModel {
        organization_id: Set(org_id.to_string()),
        username: Set(actor.to_string()),
        requested_at: Set(now_ts()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::debug!(org_id, username = actor, "join request recorded");
    Ok(())
}

/// Pending -> member, owner only. The request is consumed and the membership created
/// in the same transaction.
pub async fn accept_join_request(
    db: &DatabaseConnection,
    actor: &str,
    org_id: &str,
    username: &str,
) -> ServiceResult<()> {
    let txn = db.begin().await?;
    let org = find_organization(&txn, org_id).await?;
    if org.owner != actor {
        return Err(ServiceError::forbidden("Only owner can accept requests"));
    }
    find_user(&txn, username).await?;

    let request = JoinRequestEntity::find_by_id((org_id.to_string(), username.to_string()))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::validation("No pending request from this user"))?;
    request.delete(&txn).await?;

    if !is_member(&txn, org_id, username).await? {
        organization_member::ActiveModel {
            organization_id: Set(org_id.to_string()),
            username: Set(username.to_string()),
            joined_at: Set(now_ts()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    tracing::debug!(org_id, username, "join request accepted");
    Ok(())
}

/// Member -> unrelated.
///
/// The owner may remove any other member; any member may remove themselves. The owner
/// cannot leave, which keeps the owner inside the member set.
pub async fn remove_member(db: &DatabaseConnection, actor: &str, org_id: &str, username: &str) -> ServiceResult<()> {
    let txn = db.begin().await?;
    let org = find_organization(&txn, org_id).await?;

    if username == org.owner {
        return Err(ServiceError::validation("The owner cannot leave the organization"));
    }
    if actor != org.owner && actor != username {
        return Err(ServiceError::forbidden("Only the owner can remove other members"));
    }

    let membership = MemberEntity::find_by_id((org_id.to_string(), username.to_string()))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("User is not a member of this organization"))?;
    membership.delete(&txn).await?;

    txn.commit().await?;
    tracing::debug!(org_id, username, removed_by = actor, "member removed");
    Ok(())
}

/// Organizations `username` is a member of.
pub async fn list_for_user(db: &DatabaseConnection, username: &str) -> ServiceResult<Vec<OrganizationView>> {
    let ids = membership_ids(db, username).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let orgs = OrganizationEntity::find()
        .filter(organization::Column::Id.is_in(ids))
        .order_by_asc(organization::Column::Name)
        .all(db)
        .await?;
    views(db, orgs, username).await
}

pub async fn list_all(db: &DatabaseConnection, viewer: &str) -> ServiceResult<Vec<OrganizationView>> {
    let orgs = OrganizationEntity::find()
        .order_by_asc(organization::Column::Name)
        .all(db)
        .await?;
    views(db, orgs, viewer).await
}

/// Organizations whose name contains `query`. A blank query matches nothing.
pub async fn search(db: &DatabaseConnection, viewer: &str, query: &str) -> ServiceResult<Vec<OrganizationView>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let orgs = OrganizationEntity::find()
        .filter(organization::Column::Name.contains(query))
        .order_by_asc(organization::Column::Name)
        .all(db)
        .await?;
    views(db, orgs, viewer).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, test_db};

    async fn acme(db: &DatabaseConnection) -> OrganizationView {
        for name in ["alice", "bob", "carol"] {
            seed_user(db, name).await;
        }
        create(
            db,
            "alice",
            NewOrganization {
                name: "Acme".to_string(),
                bio: "Widgets".to_string(),
                profile_image: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn creator_is_owner_and_member() {
        let db = test_db().await;
        let org = acme(&db).await;

        assert_eq!(org.owner_username, "alice");
        assert_eq!(org.members, vec!["alice"]);
        assert_eq!(org.member_count, 1);
        assert!(org.is_owner);

        let listed = list_for_user(&db, "alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(list_for_user(&db, "bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let db = test_db().await;
        acme(&db).await;

        let err = create(
            &db,
            "bob",
            NewOrganization {
                name: "Acme".to_string(),
                bio: String::new(),
                profile_image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn join_then_accept() {
        let db = test_db().await;
        let org = acme(&db).await;

        request_to_join(&db, "bob", &org.id).await.unwrap();
        let pending = get(&db, "alice", &org.id).await.unwrap();
        assert_eq!(pending.pending_requests, vec!["bob"]);
        assert!(!pending.members.contains(&"bob".to_string()));

        accept_join_request(&db, "alice", &org.id, "bob").await.unwrap();
        let after = get(&db, "alice", &org.id).await.unwrap();
        assert!(after.members.contains(&"bob".to_string()));
        assert!(after.pending_requests.is_empty());
        assert_eq!(after.member_count, 2);
    }

    #[tokio::test]
    async fn repeated_requests_conflict() {
        let db = test_db().await;
        let org = acme(&db).await;

        assert!(matches!(
            request_to_join(&db, "alice", &org.id).await,
            Err(ServiceError::Conflict(_))
        ));

        request_to_join(&db, "bob", &org.id).await.unwrap();
        assert!(matches!(
            request_to_join(&db, "bob", &org.id).await,
            Err(ServiceError::Conflict(_))
        ));

        accept_join_request(&db, "alice", &org.id, "bob").await.unwrap();
        assert!(matches!(
            request_to_join(&db, "bob", &org.id).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn only_owner_accepts() {
        let db = test_db().await;
        let org = acme(&db).await;
        request_to_join(&db, "carol", &org.id).await.unwrap();

        assert!(matches!(
            accept_join_request(&db, "bob", &org.id, "carol").await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(!is_member(&db, &org.id, "carol").await.unwrap());

        assert!(matches!(
            accept_join_request(&db, "alice", &org.id, "bob").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            request_to_join(&db, "bob", "missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_is_owner_only() {
        let db = test_db().await;
        let org = acme(&db).await;

        let renamed = update(
            &db,
            "alice",
            &org.id,
            OrganizationUpdate {
                name: Some("Acme Corp".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Acme Corp");
        assert_eq!(renamed.bio, "Widgets");

        assert!(matches!(
            update(&db, "bob", &org.id, OrganizationUpdate::default()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            update(
                &db,
                "alice",
                &org.id,
                OrganizationUpdate {
                    name: Some("  ".to_string()),
                    ..Default::default()
                }
            )
            .await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn removal_rules() {
        let db = test_db().await;
        let org = acme(&db).await;
        for name in ["bob", "carol"] {
            request_to_join(&db, name, &org.id).await.unwrap();
            accept_join_request(&db, "alice", &org.id, name).await.unwrap();
        }

        // Members cannot remove each other.
        assert!(matches!(
            remove_member(&db, "bob", &org.id, "carol").await,
            Err(ServiceError::Forbidden(_))
        ));
        // But can leave.
        remove_member(&db, "bob", &org.id, "bob").await.unwrap();
        assert!(!is_member(&db, &org.id, "bob").await.unwrap());
        // The owner removes others.
        remove_member(&db, "alice", &org.id, "carol").await.unwrap();
        // And never leaves.
        assert!(matches!(
            remove_member(&db, "alice", &org.id, "alice").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            remove_member(&db, "alice", &org.id, "bob").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn search_and_list_all() {
        let db = test_db().await;
        acme(&db).await;
        create(
            &db,
            "bob",
            NewOrganization {
                name: "Bobcats".to_string(),
                bio: String::new(),
                profile_image: None,
            },
        )
        .await
        .unwrap();

        let all = list_all(&db, "carol").await.unwrap();
        let names: Vec<&str> = all.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Bobcats"]);
        assert!(all.iter().all(|o| !o.is_owner));

        let found = search(&db, "carol", "cat").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner_username, "bob");
    }
}
