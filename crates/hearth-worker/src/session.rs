//! Login, refresh and request authentication on top of `jwt` and `cookies`.

use sea_orm::DatabaseConnection;

use entity::user;

use crate::config::Settings;
use crate::cookies::{bearer_token, cookie_value, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::error::{ServiceError, ServiceResult};
use crate::jwt::{self, TokenError, TokenKind, TokenPair};
use crate::service::accounts;

impl From<TokenError> for ServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ServiceError::unauthenticated("Token is expired"),
            TokenError::Key => ServiceError::unauthenticated("Token could not be verified"),
            _ => ServiceError::unauthenticated("Token is invalid"),
        }
    }
}

/// Check credentials and mint a fresh token pair.
pub async fn login(
    db: &DatabaseConnection,
    settings: &Settings,
    username: &str,
    password: &str,
    now: i64,
) -> ServiceResult<(user::Model, TokenPair)> {
    let user = accounts::authenticate(db, username, password).await?;
    let pair = jwt::issue_pair(settings, &user.username, now)?;
    tracing::debug!(username = %user.username, "issued token pair");
    Ok((user, pair))
}

/// Exchange a refresh token for a new access token.
pub fn refresh(settings: &Settings, refresh_token: &str, now: i64) -> ServiceResult<String> {
    let username = jwt::verify(settings, refresh_token, TokenKind::Refresh, now)?;
    Ok(jwt::issue(settings, &username, TokenKind::Access, now)?)
}

/// Access token from the `access_token` cookie, else from `Authorization: Bearer`.
pub fn access_token(cookie_header: Option<&str>, authorization: Option<&str>) -> Option<String> {
    cookie_header
        .and_then(|h| cookie_value(h, ACCESS_COOKIE))
        .or_else(|| authorization.and_then(bearer_token))
}

pub fn refresh_token(cookie_header: Option<&str>) -> Option<String> {
    cookie_header.and_then(|h| cookie_value(h, REFRESH_COOKIE))
}

/// Resolve the acting user for a request. The account must still exist.
pub async fn current_user(
    db: &DatabaseConnection,
    settings: &Settings,
    cookie_header: Option<&str>,
    authorization: Option<&str>,
    now: i64,
) -> ServiceResult<String> {
    let token = access_token(cookie_header, authorization)
        .ok_or_else(|| ServiceError::unauthenticated("Authentication credentials were not provided."))?;
    let username = jwt::verify(settings, &token, TokenKind::Access, now)?;

    match accounts::find_user(db, &username).await {
        Ok(user) => Ok(user.username),
        Err(ServiceError::NotFound(_)) => Err(ServiceError::unauthenticated("User not found")),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, test_db, test_settings};

    #[test]
    fn cookie_wins_over_header() {
        assert_eq!(
            access_token(Some("theme=dark; access_token=abc"), Some("Bearer xyz")),
            Some("abc".to_string())
        );
        assert_eq!(access_token(Some("theme=dark"), Some("Bearer xyz")), Some("xyz".to_string()));
        assert_eq!(access_token(None, None), None);
    }

    #[tokio::test]
    async fn login_then_authenticate_requests() {
        let db = test_db().await;
        let settings = test_settings();
        seed_user(&db, "alice").await;

        let (user, pair) = login(&db, &settings, "alice", "password123", 1_000).await.unwrap();
        assert_eq!(user.username, "alice");

        let cookie = format!("access_token={}", pair.access);
        let who = current_user(&db, &settings, Some(&cookie), None, 1_001).await.unwrap();
        assert_eq!(who, "alice");

        let header = format!("Bearer {}", pair.access);
        let who = current_user(&db, &settings, None, Some(&header), 1_001).await.unwrap();
        assert_eq!(who, "alice");
    }

    #[tokio::test]
    async fn bad_credentials_and_tokens_are_unauthenticated() {
        let db = test_db().await;
        let settings = test_settings();
        seed_user(&db, "alice").await;

        assert!(matches!(
            login(&db, &settings, "alice", "nope", 0).await,
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(
            current_user(&db, &settings, None, None, 0).await,
            Err(ServiceError::Unauthenticated(_))
        ));

        let (_, pair) = login(&db, &settings, "alice", "password123", 0).await.unwrap();
        let cookie = format!("access_token={}", pair.refresh);
        assert!(matches!(
            current_user(&db, &settings, Some(&cookie), None, 1).await,
            Err(ServiceError::Unauthenticated(_))
        ));

        let expired_at = settings.access_token_ttl + 1;
        let cookie = format!("access_token={}", pair.access);
        assert!(matches!(
            current_user(&db, &settings, Some(&cookie), None, expired_at).await,
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn refresh_issues_access_token() {
        let db = test_db().await;
        let settings = test_settings();
        seed_user(&db, "alice").await;
        let (_, pair) = login(&db, &settings, "alice", "password123", 0).await.unwrap();

        let access = refresh(&settings, &pair.refresh, 10).unwrap();
        assert_eq!(jwt::verify(&settings, &access, TokenKind::Access, 11).unwrap(), "alice");
        assert!(refresh(&settings, &pair.access, 10).is_err());
    }
}
