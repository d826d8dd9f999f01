use serde::Deserialize;
use worker::{Env, Method, Request, Response, Result};

use crate::pagination::parse_page;
use crate::service::posts;
use crate::worker_wasm::http::{
    invalid_json, json_response, method_not_allowed, query_param, respond, service_error_response,
};

use super::auth::{authenticate, AuthResult};

/// GET /api/posts/<username>/
pub async fn handle_user_posts(req: Request, env: &Env, username: String) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, posts::user_posts(&auth.ctx.db, &auth.username, &username).await)
}

#[derive(Debug, Deserialize)]
struct CreatePostData {
    description: String,
}

/// POST /api/create_post/
pub async fn handle_create_post(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: CreatePostData = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "create_post", &e),
    };

    respond(
        &req,
        201,
        posts::create_post(&auth.ctx.db, &auth.username, &payload.description).await,
    )
}

/// GET /api/get_posts/?page=
pub async fn handle_feed(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let page = match parse_page(query_param(&req, "page")?.as_deref()) {
        Ok(p) => p,
        Err(e) => return service_error_response(&req, &e),
    };
    respond(&req, 200, posts::feed(&auth.ctx.db, &auth.username, page).await)
}

#[derive(Debug, Deserialize)]
struct ToggleLikeData {
    id: String,
}

/// POST /api/toggleLike/
pub async fn handle_toggle_like(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: ToggleLikeData = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "toggle_like", &e),
    };

    match posts::toggle_like(&auth.ctx.db, &auth.username, &payload.id).await {
        Ok(now_liked) => json_response(&req, 200, &serde_json::json!({ "now_liked": now_liked })),
        Err(e) => service_error_response(&req, &e),
    }
}
