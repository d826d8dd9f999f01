use serde::Deserialize;
use worker::{Env, Method, Request, Response, Result};

use crate::cookies::{expired_cookie, session_cookie, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::error::ServiceError;
use crate::session;
use crate::throttle::{self, REFRESH_SCOPE};
use crate::util::now_ts;
use crate::worker_wasm::http::{
    error_response, header, invalid_json, json_response, method_not_allowed, service_error_response, set_cookie,
};

use super::auth::{authenticate, reuse_or_open, AuthResult, Context, ContextResult};

#[derive(Debug, Deserialize)]
struct LoginData {
    username: String,
    password: String,
}

/// POST /api/login/ and /api/token/: verify credentials and set both session cookies.
pub async fn handle_login(mut req: Request, env: &Env, ctx: Option<Context>) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let payload: LoginData = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "login", &e),
    };

    let ctx = match reuse_or_open(&req, env, ctx).await? {
        ContextResult::Ready(ctx) => ctx,
        ContextResult::Failed(resp) => return Ok(resp),
    };

    let now = now_ts();
    let (user, pair) = match session::login(&ctx.db, &ctx.settings, &payload.username, &payload.password, now).await {
        Ok(v) => v,
        Err(e) => return service_error_response(&req, &e),
    };

    let mut resp = json_response(
        &req,
        200,
        &serde_json::json!({
            "success": true,
            "user": {
                "username": user.username,
                "bio": user.bio,
                "email": user.email,
                "first_name": user.first_name,
                "last_name": user.last_name,
            }
        }),
    )?;
    set_cookie(
        &mut resp,
        &session_cookie(ACCESS_COOKIE, &pair.access, Some(ctx.settings.access_token_ttl)),
    )?;
    set_cookie(
        &mut resp,
        &session_cookie(REFRESH_COOKIE, &pair.refresh, Some(ctx.settings.refresh_token_ttl)),
    )?;
    Ok(resp)
}

/// POST /api/token/refresh/: rotate the access cookie from the refresh cookie.
///
/// Throttled per client address on top of the global login bucket.
pub async fn handle_token_refresh(req: Request, env: &Env, ctx: Option<Context>) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let ctx = match reuse_or_open(&req, env, ctx).await? {
        ContextResult::Ready(ctx) => ctx,
        ContextResult::Failed(resp) => return Ok(resp),
    };

    let now = now_ts();
    let client = header(&req, "CF-Connecting-IP")?.unwrap_or_else(|| "unknown".to_string());
    let key = throttle::cache_key(REFRESH_SCOPE, &client);
    if let Err(e) = throttle::hit(&ctx.db, &key, ctx.settings.refresh_rate, now).await {
        return service_error_response(&req, &e);
    }

    let cookie = header(&req, "Cookie")?;
    let Some(refresh_token) = session::refresh_token(cookie.as_deref()) else {
        return error_response(&req, 400, "validation_error", "No refresh token provided");
    };

    let access = match session::refresh(&ctx.settings, &refresh_token, now) {
        Ok(token) => token,
        // Refresh failures are 400, not 401.
        Err(ServiceError::Unauthenticated(msg)) => {
            return error_response(&req, 400, "invalid_refresh_token", &msg);
        }
        Err(e) => return service_error_response(&req, &e),
    };

    let mut resp = json_response(&req, 200, &serde_json::json!({ "success": true }))?;
    set_cookie(
        &mut resp,
        &session_cookie(ACCESS_COOKIE, &access, Some(ctx.settings.access_token_ttl)),
    )?;
    Ok(resp)
}

/// POST /api/logout/: clear both session cookies.
pub async fn handle_logout(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    if let AuthResult::Unauthorized(resp) = authenticate(&req, env).await? {
        return Ok(resp);
    }

    let mut resp = json_response(&req, 200, &serde_json::json!({ "success": true }))?;
    set_cookie(&mut resp, &expired_cookie(ACCESS_COOKIE))?;
    set_cookie(&mut resp, &expired_cookie(REFRESH_COOKIE))?;
    Ok(resp)
}
