//! Fixed-window request throttles.
//!
//! Counters live in the `throttle_buckets` table because Worker isolates do not share
//! memory. A bucket is addressed by `throttle_<scope>_<ident>`; the login throttle
//! deliberately uses the single ident `global`, so every client draws from one bucket.

use std::str::FromStr;

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use thiserror::Error;

use entity::throttle_bucket::{self, Column};

use crate::error::{ServiceError, ServiceResult};
use crate::routes::Verb;

pub const LOGIN_SCOPE: &str = "login";
pub const REFRESH_SCOPE: &str = "refresh";
pub const JOIN_SCOPE: &str = "join";

/// `limit` requests per `period_secs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rate {
    pub limit: u32,
    pub period_secs: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected <count>/<period> with period s, m, h or d")]
pub struct InvalidRate;

impl FromStr for Rate {
    type Err = InvalidRate;

    /// Parses `5/min`, `2/minute`, `100/h`, `1000/day`. Only the first letter of the
    /// period is significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, period) = s.trim().split_once('/').ok_or(InvalidRate)?;
        let limit: u32 = count.trim().parse().map_err(|_| InvalidRate)?;
        let period_secs = match period.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 60 * 60,
            Some('d') => 24 * 60 * 60,
            _ => return Err(InvalidRate),
        };
        if limit == 0 {
            return Err(InvalidRate);
        }
        Ok(Self { limit, period_secs })
    }
}

pub fn cache_key(scope: &str, ident: &str) -> String {
    format!("throttle_{scope}_{ident}")
}

/// Bucket key for the global login throttle, or `None` when the request is exempt.
///
/// Applies to POSTs whose handler name mentions `login`, `token` or `auth`.
pub fn login_cache_key(verb: Verb, handler_name: &str) -> Option<String> {
    if verb != Verb::Post {
        return None;
    }
    let name = handler_name.to_ascii_lowercase();
    if name.contains("login") || name.contains("token") || name.contains("auth") {
        Some(cache_key(LOGIN_SCOPE, "global"))
    } else {
        None
    }
}

/// Record one request against `key`, failing with `RateLimited` once the window is full.
///
/// The check and the increment are one upsert, so concurrent callers serialize on the
/// row inside the database. An expired window restarts at `now`; a full one is left
/// untouched, so rejected requests do not consume quota.
pub async fn hit<C: ConnectionTrait>(db: &C, key: &str, rate: Rate, now: i64) -> ServiceResult<()> {
    let hits = Expr::col((throttle_bucket::Entity, Column::Hits));
    let window_start = Expr::col((throttle_bucket::Entity, Column::WindowStart));
    let expired = window_start.clone().lte(now - rate.period_secs);

    let on_conflict = OnConflict::column(Column::Key)
        .value(Column::Hits, Expr::case(expired.clone(), 1).finally(hits.clone().add(1)))
        .value(Column::WindowStart, Expr::case(expired.clone(), now).finally(window_start))
        .action_and_where(expired.or(hits.lt(i64::from(rate.limit))))
        .to_owned();

    let admitted = throttle_bucket::Entity::insert(throttle_bucket::ActiveModel {
        key: Set(key.to_string()),
        window_start: Set(now),
        hits: Set(1),
    })
    .on_conflict(on_conflict)
    .exec_without_returning(db)
    .await?;

    if admitted > 0 {
        return Ok(());
    }

    let opened = throttle_bucket::Entity::find_by_id(key.to_string())
        .one(db)
        .await?
        .map_or(now, |b| b.window_start);
    let retry_after = (opened + rate.period_secs - now).max(1);
    tracing::warn!(key, retry_after, "throttle rejected request");
    Err(ServiceError::RateLimited { retry_after })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scratch_db, test_db};

    #[test]
    fn parses_rates() {
        assert_eq!("2/min".parse::<Rate>(), Ok(Rate { limit: 2, period_secs: 60 }));
        assert_eq!("2/minute".parse::<Rate>(), Ok(Rate { limit: 2, period_secs: 60 }));
        assert_eq!("10/s".parse::<Rate>(), Ok(Rate { limit: 10, period_secs: 1 }));
        assert_eq!("3/hour".parse::<Rate>(), Ok(Rate { limit: 3, period_secs: 3600 }));
        assert_eq!("1000/day".parse::<Rate>(), Ok(Rate { limit: 1000, period_secs: 86_400 }));
        assert_eq!("2/fortnight".parse::<Rate>(), Err(InvalidRate));
        assert_eq!("0/min".parse::<Rate>(), Err(InvalidRate));
        assert_eq!("min".parse::<Rate>(), Err(InvalidRate));
    }

    #[test]
    fn invalid_rate_describes_the_format() {
        let err: Box<dyn std::error::Error> = Box::new("5/fortnight".parse::<Rate>().unwrap_err());
        assert_eq!(err.to_string(), "expected <count>/<period> with period s, m, h or d");
    }

    #[test]
    fn login_key_is_global_and_post_only() {
        let expected = Some("throttle_login_global".to_string());
        assert_eq!(login_cache_key(Verb::Post, "login"), expected);
        assert_eq!(login_cache_key(Verb::Post, "token_obtain_pair"), expected);
        assert_eq!(login_cache_key(Verb::Post, "token_refresh"), expected);
        assert_eq!(login_cache_key(Verb::Get, "authenticated"), None);
        assert_eq!(login_cache_key(Verb::Post, "register"), None);
        assert_eq!(login_cache_key(Verb::Post, "create_post"), None);
    }

    #[tokio::test]
    async fn third_hit_in_window_is_rejected_for_everyone() {
        let db = test_db().await;
        let rate = Rate { limit: 2, period_secs: 60 };
        let key = login_cache_key(Verb::Post, "login").unwrap();

        // Three different callers, one shared bucket.
        hit(&db, &key, rate, 1_000).await.unwrap();
        hit(&db, &key, rate, 1_010).await.unwrap();
        let err = hit(&db, &key, rate, 1_020).await.unwrap_err();
        match err {
            ServiceError::RateLimited { retry_after } => assert_eq!(retry_after, 40),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn window_resets_after_period() {
        let db = test_db().await;
        let rate = Rate { limit: 1, period_secs: 60 };
        let key = cache_key(REFRESH_SCOPE, "203.0.113.9");

        hit(&db, &key, rate, 100).await.unwrap();
        assert!(hit(&db, &key, rate, 159).await.is_err());
        hit(&db, &key, rate, 160).await.unwrap();

        let bucket = throttle_bucket::Entity::find_by_id(key.clone())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bucket.window_start, 160);
        assert_eq!(bucket.hits, 1);
    }

    #[tokio::test]
    async fn concurrent_hits_share_one_counter() {
        let scratch = scratch_db(8).await;
        let rate = Rate { limit: 3, period_secs: 60 };
        let key = login_cache_key(Verb::Post, "login").unwrap();

        for round in 0..10_i64 {
            let now = 10_000 + round * rate.period_secs;
            let calls: Vec<_> = (0..6)
                .map(|_| {
                    let db = scratch.db.clone();
                    let key = key.clone();
                    tokio::spawn(async move { hit(&db, &key, rate, now).await })
                })
                .collect();

            let (mut admitted, mut limited) = (0, 0);
            for call in calls {
                match call.await.unwrap() {
                    Ok(()) => admitted += 1,
                    Err(ServiceError::RateLimited { .. }) => limited += 1,
                    Err(other) => panic!("round {round}: unexpected error: {other:?}"),
                }
            }
            assert_eq!((admitted, limited), (3, 3), "round {round}");

            let bucket = throttle_bucket::Entity::find_by_id(key.clone())
                .one(&scratch.db)
                .await
                .unwrap()
                .unwrap();
            assert_eq!((bucket.window_start, bucket.hits), (now, 3), "round {round}");
        }
    }

    #[tokio::test]
    async fn buckets_are_independent() {
        let db = test_db().await;
        let rate = Rate { limit: 1, period_secs: 60 };

        hit(&db, &cache_key(REFRESH_SCOPE, "a"), rate, 0).await.unwrap();
        hit(&db, &cache_key(REFRESH_SCOPE, "b"), rate, 0).await.unwrap();
        assert!(hit(&db, &cache_key(REFRESH_SCOPE, "a"), rate, 1).await.is_err());
    }
}
