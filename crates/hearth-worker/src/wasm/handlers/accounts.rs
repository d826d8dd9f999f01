use serde::Deserialize;
use worker::{Env, Method, Request, Response, Result};

use crate::service::accounts::{self, Registration, UserUpdate, UserView};
use crate::service::follows;
use crate::worker_wasm::http::{
    invalid_json, json_response, method_not_allowed, query_param, respond, service_error_response,
};

use super::auth::{authenticate, open_context, AuthResult, ContextResult};

/// POST /api/register/
pub async fn handle_register(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let payload: Registration = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "register", &e),
    };

    let ctx = match open_context(&req, env).await? {
        ContextResult::Ready(ctx) => ctx,
        ContextResult::Failed(resp) => return Ok(resp),
    };

    let result = accounts::register(&ctx.db, &ctx.settings, payload)
        .await
        .map(UserView::from);
    respond(&req, 200, result)
}

/// GET /api/check-username/?username=
pub async fn handle_check_username(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let username = query_param(&req, "username")?.unwrap_or_default();
    let username = username.trim();
    if username.is_empty() {
        return json_response(&req, 200, &serde_json::json!({ "available": false }));
    }

    let ctx = match open_context(&req, env).await? {
        ContextResult::Ready(ctx) => ctx,
        ContextResult::Failed(resp) => return Ok(resp),
    };

    match accounts::username_available(&ctx.db, username).await {
        Ok(available) => json_response(&req, 200, &serde_json::json!({ "available": available })),
        Err(e) => service_error_response(&req, &e),
    }
}

/// GET /api/authenticated/
pub async fn handle_authenticated(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    match authenticate(&req, env).await? {
        AuthResult::Authorized(_) => json_response(&req, 200, &"authenticated"),
        AuthResult::Unauthorized(resp) => Ok(resp),
    }
}

/// GET /api/user_data/<username>/
pub async fn handle_user_profile(req: Request, env: &Env, username: String) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, accounts::profile(&auth.ctx.db, &auth.username, &username).await)
}

/// PATCH /api/update_user/
pub async fn handle_update_user(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Patch {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: UserUpdate = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "update_user", &e),
    };

    match accounts::update_details(&auth.ctx.db, &auth.username, payload).await {
        Ok(user) => {
            let mut body = serde_json::to_value(UserView::from(user))?;
            body["success"] = serde_json::Value::Bool(true);
            json_response(&req, 200, &body)
        }
        Err(e) => service_error_response(&req, &e),
    }
}

/// GET /api/search/?query=
pub async fn handle_search_users(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let query = query_param(&req, "query")?.unwrap_or_default();
    respond(&req, 200, accounts::search_users(&auth.ctx.db, &query).await)
}

#[derive(Debug, Deserialize)]
struct ToggleFollowData {
    username: String,
}

/// POST /api/toggle_follow/
pub async fn handle_toggle_follow(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: ToggleFollowData = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "toggle_follow", &e),
    };

    match follows::toggle_follow(&auth.ctx.db, &auth.username, &payload.username).await {
        Ok(following) => json_response(&req, 200, &serde_json::json!({ "following": following })),
        Err(e) => service_error_response(&req, &e),
    }
}
