use serde::Deserialize;
use worker::{Env, Method, Request, Response, Result};

use crate::service::organizations::{self, NewOrganization, OrganizationUpdate};
use crate::service::org_posts;
use crate::throttle::{self, JOIN_SCOPE};
use crate::util::now_ts;
use crate::worker_wasm::http::{
    invalid_json, json_response, method_not_allowed, no_content, query_param, respond, service_error_response,
};

use super::auth::{authenticate, AuthResult};

/// POST /api/organization/create/
pub async fn handle_create_organization(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: NewOrganization = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "create_organization", &e),
    };

    respond(&req, 201, organizations::create(&auth.ctx.db, &auth.username, payload).await)
}

/// POST /api/organization/join/<id>/, throttled per user.
pub async fn handle_join(req: Request, env: &Env, org_id: String) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let key = throttle::cache_key(JOIN_SCOPE, &auth.username);
    if let Err(e) = throttle::hit(&auth.ctx.db, &key, auth.ctx.settings.join_rate, now_ts()).await {
        return service_error_response(&req, &e);
    }

    match organizations::request_to_join(&auth.ctx.db, &auth.username, &org_id).await {
        Ok(()) => json_response(&req, 200, &serde_json::json!({ "success": "Join request sent" })),
        Err(e) => service_error_response(&req, &e),
    }
}

/// POST /api/organization/accept/<id>/<username>/
pub async fn handle_accept(req: Request, env: &Env, org_id: String, username: String) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    match organizations::accept_join_request(&auth.ctx.db, &auth.username, &org_id, &username).await {
        Ok(()) => json_response(&req, 200, &serde_json::json!({ "success": "User added to organization" })),
        Err(e) => service_error_response(&req, &e),
    }
}

/// GET /api/organization/<id>/
pub async fn handle_organization(req: Request, env: &Env, org_id: String) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, organizations::get(&auth.ctx.db, &auth.username, &org_id).await)
}

/// PATCH /api/organization/<id>/update/
pub async fn handle_update(mut req: Request, env: &Env, org_id: String) -> Result<Response> {
    if req.method() != Method::Patch {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: OrganizationUpdate = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "update_organization", &e),
    };

    respond(
        &req,
        200,
        organizations::update(&auth.ctx.db, &auth.username, &org_id, payload).await,
    )
}

/// DELETE /api/organization/<id>/members/<username>/
pub async fn handle_remove_member(req: Request, env: &Env, org_id: String, username: String) -> Result<Response> {
    if req.method() != Method::Delete {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    match organizations::remove_member(&auth.ctx.db, &auth.username, &org_id, &username).await {
        Ok(()) => no_content(&req),
        Err(e) => service_error_response(&req, &e),
    }
}

/// GET /api/organization/user/
pub async fn handle_user_organizations(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, organizations::list_for_user(&auth.ctx.db, &auth.username).await)
}

/// GET /api/organization/all/
pub async fn handle_all_organizations(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, organizations::list_all(&auth.ctx.db, &auth.username).await)
}

/// GET /api/search_organizations/?query=
pub async fn handle_search(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let query = query_param(&req, "query")?.unwrap_or_default();
    respond(&req, 200, organizations::search(&auth.ctx.db, &auth.username, &query).await)
}

/// GET /api/organization/posts/<id>/
pub async fn handle_organization_posts(req: Request, env: &Env, org_id: String) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, org_posts::org_posts(&auth.ctx.db, &auth.username, &org_id).await)
}

/// GET /api/organization/feed/
pub async fn handle_organization_feed(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, org_posts::org_feed(&auth.ctx.db, &auth.username).await)
}

#[derive(Debug, Deserialize)]
struct CreateOrgPostData {
    #[serde(alias = "organization")]
    organization_id: String,
    description: String,
}

/// POST /api/create_org_post/
pub async fn handle_create_org_post(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: CreateOrgPostData = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "create_org_post", &e),
    };

    respond(
        &req,
        201,
        org_posts::create_org_post(&auth.ctx.db, &auth.username, &payload.organization_id, &payload.description)
            .await,
    )
}

#[derive(Debug, Deserialize)]
struct ToggleLikeData {
    id: String,
}

/// POST /api/toggleOrgPostLike/
pub async fn handle_toggle_org_post_like(mut req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: ToggleLikeData = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "toggle_org_post_like", &e),
    };

    match org_posts::toggle_org_post_like(&auth.ctx.db, &auth.username, &payload.id).await {
        Ok(now_liked) => json_response(&req, 200, &serde_json::json!({ "now_liked": now_liked })),
        Err(e) => service_error_response(&req, &e),
    }
}
