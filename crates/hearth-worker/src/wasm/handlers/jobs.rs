use worker::{Env, Method, Request, Response, Result};

use crate::pagination::parse_page;
use crate::service::jobs::{self, NewApplication, NewJob};
use crate::worker_wasm::http::{
    invalid_json, method_not_allowed, no_content, query_param, respond, service_error_response,
};

use super::auth::{authenticate, AuthResult};

/// GET lists postings a page at a time; POST creates one.
pub async fn handle_jobs(mut req: Request, env: &Env) -> Result<Response> {
    let method = req.method();
    if method != Method::Get && method != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    if method == Method::Get {
        let page = match parse_page(query_param(&req, "page")?.as_deref()) {
            Ok(p) => p,
            Err(e) => return service_error_response(&req, &e),
        };
        return respond(&req, 200, jobs::list_jobs(&auth.ctx.db, page).await);
    }

    let payload: NewJob = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "create_job", &e),
    };
    respond(&req, 201, jobs::create_job(&auth.ctx.db, &auth.username, payload).await)
}

/// GET fetches a posting; DELETE removes it (creator only).
pub async fn handle_job(req: Request, env: &Env, job_id: String) -> Result<Response> {
    let method = req.method();
    if method != Method::Get && method != Method::Delete {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    if method == Method::Get {
        return respond(&req, 200, jobs::get_job(&auth.ctx.db, &job_id).await);
    }

    match jobs::delete_job(&auth.ctx.db, &auth.username, &job_id).await {
        Ok(()) => no_content(&req),
        Err(e) => service_error_response(&req, &e),
    }
}

/// POST /api/jobs/<id>/apply/
pub async fn handle_apply(mut req: Request, env: &Env, job_id: String) -> Result<Response> {
    if req.method() != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let payload: NewApplication = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "apply_to_job", &e),
    };
    respond(&req, 201, jobs::apply(&auth.ctx.db, &auth.username, &job_id, payload).await)
}

/// GET /api/jobs/<id>/applications/
pub async fn handle_applications(req: Request, env: &Env, job_id: String) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, jobs::applications(&auth.ctx.db, &auth.username, &job_id).await)
}

/// GET /api/my-jobs/
pub async fn handle_my_jobs(req: Request, env: &Env) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, jobs::my_jobs(&auth.ctx.db, &auth.username).await)
}
