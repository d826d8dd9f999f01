use subtle::ConstantTimeEq;
use worker::{Env, Request, Response, Result};

use crate::cookies::bearer_token;
use crate::worker_wasm::env::env_string;
use crate::worker_wasm::http::{error_response, header};

/// Shared authorization logic for admin endpoints.
///
/// Admin endpoints are disabled unless `ADMIN_TOKEN` is configured; when it is, the
/// request must present it as a bearer token.
///
/// Returns `Ok(None)` when authorized; otherwise returns an error response.
pub async fn ensure_admin_authorized(req: &Request, env: &Env) -> Result<Option<Response>> {
    let Some(required) = env_string(env, "ADMIN_TOKEN") else {
        return Ok(Some(error_response(
            req,
            404,
            "not_found",
            "Not found",
        )?));
    };

    let Some(token) = header(req, "Authorization")?.as_deref().and_then(bearer_token) else {
        return Ok(Some(error_response(
            req,
            401,
            "missing_token",
            "Missing Authorization Bearer token",
        )?));
    };

    if !bool::from(token.as_bytes().ct_eq(required.as_bytes())) {
        return Ok(Some(error_response(
            req,
            401,
            "unauthorized",
            "Invalid admin token",
        )?));
    }

    Ok(None)
}
