pub use sea_orm_migration::prelude::*;

mod m20261016_000001_users_and_follows;
mod m20261016_000002_organizations;
mod m20261016_000003_posts;
mod m20261016_000004_events;
mod m20261016_000005_jobs;
mod m20261016_000006_throttle_buckets;

pub struct Migrator;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_users_and_follows::Migration),
            Box::new(m20261016_000002_organizations::Migration),
            Box::new(m20261016_000003_posts::Migration),
            Box::new(m20261016_000004_events::Migration),
            Box::new(m20261016_000005_jobs::Migration),
            Box::new(m20261016_000006_throttle_buckets::Migration),
        ]
    }
}
