//! Stepwise schema upgrades driven from the admin endpoint.
//!
//! Every statement against D1 is a subrequest, so a deploy applies a few migrations per
//! call and the operator repeats the call until `done` comes back true.

use migration::{IntoSchemaManagerConnection, Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, DbErr};
use serde::Serialize;

pub const DEFAULT_STEPS: u32 = 1;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub requested_steps: u32,
    pub applied_now: usize,
    pub pending: usize,
    pub done: bool,
    pub next: Option<String>,
}

/// `?steps=` value; anything missing, zero or unparseable means [`DEFAULT_STEPS`].
pub fn parse_steps(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_STEPS)
}

/// Names of the migrations not yet applied, oldest first.
pub async fn pending<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, DbErr> {
    let migrations = Migrator::get_pending_migrations(db).await?;
    Ok(migrations.iter().map(|m| m.name().to_string()).collect())
}

pub async fn upgrade<C>(db: &C, steps: u32) -> Result<MigrationReport, DbErr>
where
    C: ConnectionTrait,
    for<'c> &'c C: IntoSchemaManagerConnection<'c>,
{
    let before = pending(db).await?;
    let to_apply = steps.min(u32::try_from(before.len()).unwrap_or(u32::MAX));
    if to_apply > 0 {
        Migrator::up(db, Some(to_apply)).await?;
    }

    let after = pending(db).await?;
    let applied_now = before.len().saturating_sub(after.len());
    tracing::info!(applied_now, pending = after.len(), "schema upgrade");
    Ok(MigrationReport {
        requested_steps: steps,
        applied_now,
        pending: after.len(),
        done: after.is_empty(),
        next: after.into_iter().next(),
    })
}
