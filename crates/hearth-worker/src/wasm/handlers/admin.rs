use worker::{Env, Request, Response, Result};

use crate::schema;
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::http::{internal_error_response, json_response};

use super::admin_auth::ensure_admin_authorized;

/// Connectivity check that also reports how far the schema lags behind.
pub async fn handle_db_ping(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env).await? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(req, "Failed to open database connection", &e),
    };

    if let Err(e) = db.ping().await {
        return internal_error_response(req, "Database ping failed", &e);
    }

    let pending = match schema::pending(&db).await {
        Ok(p) => p,
        Err(e) => return internal_error_response(req, "Failed to read pending migrations", &e),
    };

    json_response(
        req,
        200,
        &serde_json::json!({
            "success": true,
            "db": { "ok": true, "pending_migrations": pending.len(), "next": pending.first() }
        }),
    )
}
