use worker::{Env, Request, Response, Result};

use crate::schema;
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::http::{internal_error_response, json_response, query_param};

use super::admin_auth::ensure_admin_authorized;

/// POST /v1/admin/migrations/up?steps=N
pub async fn handle_migrations_up(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env).await? {
        return Ok(resp);
    }

    let steps = schema::parse_steps(query_param(req, "steps")?.as_deref());
    let report = match db_connect(env).await {
        Ok(db) => schema::upgrade(&db, steps).await,
        Err(e) => return internal_error_response(req, "D1 unavailable", &e),
    };

    match report {
        Ok(report) => json_response(req, 200, &serde_json::json!({ "success": true, "migrations": report })),
        Err(e) => internal_error_response(req, "Schema upgrade failed", &e),
    }
}
