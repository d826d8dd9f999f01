//! Shared fixtures for the service tests.

use std::collections::HashMap;
use std::path::PathBuf;

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Settings;
use crate::service::accounts::{self, Registration};
use crate::util::uuid_v4;

/// Fresh in-memory database with no schema.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn empty_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opts).await.expect("open sqlite")
}

/// Fresh in-memory database with every migration applied.
pub async fn test_db() -> DatabaseConnection {
    let db = empty_db().await;
    migration::Migrator::up(&db, None).await.expect("migrate");
    db
}

/// Migrated database file removed on drop.
pub struct ScratchDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for ScratchDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut name = self.path.clone().into_os_string();
            name.push(suffix);
            let _ = std::fs::remove_file(name);
        }
    }
}

/// File-backed database with `connections` pooled connections, so queries can
/// really run side by side.
pub async fn scratch_db(connections: u32) -> ScratchDb {
    let path = std::env::temp_dir().join(format!("hearth-{}.db", uuid_v4()));
    let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    opts.max_connections(connections).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("open sqlite file");
    migration::Migrator::up(&db, None).await.expect("migrate");
    ScratchDb { db, path }
}

pub fn test_settings() -> Settings {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", "test-secret-test-secret-test-secret!"),
        ("PASSWORD_ITERATIONS", "1000"),
        ("LOGIN_THROTTLE_RATE", "2/min"),
    ]);
    Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).expect("test settings")
}

/// Register `username` with password `password123`.
pub async fn seed_user(db: &DatabaseConnection, username: &str) -> entity::user::Model {
    accounts::register(
        db,
        &test_settings(),
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            password: "password123".to_string(),
        },
    )
    .await
    .expect("seed user")
}
