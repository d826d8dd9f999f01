use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use entity::{user, user::Entity as UserEntity};

use crate::config::Settings;
use crate::crypto::{hash_new_password, verify_password_hash};
use crate::error::{ServiceError, ServiceResult};
use crate::service::{follows, validate};
use crate::util::now_ts;

const SEARCH_LIMIT: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
}

/// Public account fields.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub username: String,
    pub bio: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for UserView {
    fn from(u: user::Model) -> Self {
        Self {
            username: u.username,
            bio: u.bio,
            email: u.email,
            profile_image: u.profile_image,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
    pub is_owner: bool,
    pub following: bool,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub bio: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
}

pub async fn find_user<C: ConnectionTrait>(db: &C, username: &str) -> ServiceResult<user::Model> {
    UserEntity::find_by_id(username.to_string())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user does not exist"))
}

pub async fn register(
    db: &DatabaseConnection,
    settings: &Settings,
    reg: Registration,
) -> ServiceResult<user::Model> {
    let username = validate::username(&reg.username)?;
    let email = validate::email(&reg.email)?;
    validate::at_most("first_name", &reg.first_name, 150)?;
    validate::at_most("last_name", &reg.last_name, 150)?;
    if reg.password.is_empty() {
        return Err(ServiceError::validation("password: This field may not be blank."));
    }

    if !username_available(db, &username).await? {
        return Err(ServiceError::conflict("A user with that username already exists."));
    }

    let now = now_ts();
    let hashed = hash_new_password(&reg.password, settings.password_iterations);

    let model = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        first_name: Set(reg.first_name.trim().to_string()),
        last_name: Set(reg.last_name.trim().to_string()),
        bio: Set(String::new()),
        profile_image: Set(None),
        password_hash: Set(hashed.hash),
        salt: Set(hashed.salt),
        password_iterations: Set(i64::from(hashed.iterations)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::debug!(username = %model.username, "registered user");
    Ok(model)
}

pub async fn username_available<C: ConnectionTrait>(db: &C, username: &str) -> ServiceResult<bool> {
    let found = UserEntity::find_by_id(username.to_string()).one(db).await?;
    Ok(found.is_none())
}

/// Check a username/password pair. Unknown users and wrong passwords fail identically.
pub async fn authenticate(db: &DatabaseConnection, username: &str, password: &str) -> ServiceResult<user::Model> {
    let invalid = || ServiceError::unauthenticated("No active account found with the given credentials");

    let Some(user) = UserEntity::find_by_id(username.trim().to_string()).one(db).await? else {
        return Err(invalid());
    };

    let iterations = u32::try_from(user.password_iterations).unwrap_or(0);
    if !verify_password_hash(password.as_bytes(), &user.salt, &user.password_hash, iterations) {
        return Err(invalid());
    }
    Ok(user)
}

pub async fn profile(db: &DatabaseConnection, viewer: &str, username: &str) -> ServiceResult<Profile> {
    let user = find_user(db, username).await?;
    let follower_count = follows::follower_count(db, &user.username).await?;
    let following_count = follows::following_count(db, &user.username).await?;
    let following = follows::is_following(db, viewer, &user.username).await?;

    Ok(Profile {
        is_owner: viewer == user.username,
        username: user.username,
        bio: user.bio,
        profile_image: user.profile_image,
        follower_count,
        following_count,
        following,
    })
}

pub async fn update_details(db: &DatabaseConnection, username: &str, update: UserUpdate) -> ServiceResult<user::Model> {
    let user = find_user(db, username).await?;
    let mut active: user::ActiveModel = user.into();

    if let Some(bio) = update.bio {
        validate::at_most("bio", &bio, validate::BIO_MAX)?;
        active.bio = Set(bio);
    }
    if let Some(email) = update.email {
        active.email = Set(validate::email(&email)?);
    }
    if let Some(first_name) = update.first_name {
        validate::at_most("first_name", &first_name, 150)?;
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = update.last_name {
        validate::at_most("last_name", &last_name, 150)?;
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(image) = update.profile_image {
        active.profile_image = Set(validate::optional("profile_image", Some(&image), 500)?);
    }
    active.updated_at = Set(now_ts());

    Ok(active.update(db).await?)
}

/// Users whose username contains `query`, case-insensitively. A blank query matches nobody.
pub async fn search_users(db: &DatabaseConnection, query: &str) -> ServiceResult<Vec<UserView>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let users = UserEntity::find()
        .filter(user::Column::Username.contains(query))
        .order_by_asc(user::Column::Username)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;

    Ok(users.into_iter().map(UserView::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, test_db, test_settings};

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            password: "hunter22".to_string(),
        }
    }

    #[tokio::test]
    async fn check_username_tracks_registration() {
        let db = test_db().await;
        assert!(username_available(&db, "alice").await.unwrap());

        register(&db, &test_settings(), registration("alice")).await.unwrap();
        assert!(!username_available(&db, "alice").await.unwrap());
        assert!(username_available(&db, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = test_db().await;
        register(&db, &test_settings(), registration("alice")).await.unwrap();

        let err = register(&db, &test_settings(), registration("alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_registration_fields() {
        let db = test_db().await;
        let mut bad_name = registration("bad name");
        bad_name.username = "bad name".to_string();
        assert!(matches!(
            register(&db, &test_settings(), bad_name).await,
            Err(ServiceError::Validation(_))
        ));

        let mut no_password = registration("carol");
        no_password.password.clear();
        assert!(matches!(
            register(&db, &test_settings(), no_password).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let db = test_db().await;
        seed_user(&db, "alice").await;

        let user = authenticate(&db, "alice", "password123").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(matches!(
            authenticate(&db, "alice", "wrong").await,
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(
            authenticate(&db, "nobody", "password123").await,
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn password_is_not_serialized() {
        let db = test_db().await;
        let user = seed_user(&db, "alice").await;
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("salt").is_none());
    }

    #[tokio::test]
    async fn update_details_is_partial() {
        let db = test_db().await;
        seed_user(&db, "alice").await;

        let updated = update_details(
            &db,
            "alice",
            UserUpdate {
                bio: Some("Rustacean".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.bio, "Rustacean");
        assert_eq!(updated.email, "alice@example.com");

        let too_long = UserUpdate {
            bio: Some("x".repeat(801)),
            ..Default::default()
        };
        assert!(update_details(&db, "alice", too_long).await.is_err());
    }

    #[tokio::test]
    async fn profile_reports_viewer_relation() {
        let db = test_db().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;
        follows::toggle_follow(&db, "bob", "alice").await.unwrap();

        let own = profile(&db, "alice", "alice").await.unwrap();
        assert!(own.is_owner);
        assert_eq!(own.follower_count, 1);
        assert_eq!(own.following_count, 0);

        let seen_by_bob = profile(&db, "bob", "alice").await.unwrap();
        assert!(!seen_by_bob.is_owner);
        assert!(seen_by_bob.following);

        assert!(matches!(
            profile(&db, "bob", "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn search_is_substring_match() {
        let db = test_db().await;
        for name in ["alice", "malik", "bob"] {
            seed_user(&db, name).await;
        }

        let hits: Vec<String> = search_users(&db, "li")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(hits, vec!["alice", "malik"]);
        assert!(search_users(&db, "  ").await.unwrap().is_empty());
    }
}
