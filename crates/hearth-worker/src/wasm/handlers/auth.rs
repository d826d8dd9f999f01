use sea_orm::DatabaseConnection;
use worker::{Env, Request, Response, Result};

use crate::config::Settings;
use crate::session;
use crate::util::now_ts;
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::env::load_settings;
use crate::worker_wasm::http::{header, internal_error_response, service_error_response};

/// Per-request database handle and settings.
pub struct Context {
    pub db: DatabaseConnection,
    pub settings: Settings,
}

pub enum ContextResult {
    Ready(Context),
    Failed(Response),
}

pub struct Authenticated {
    pub ctx: Context,
    pub username: String,
}

pub enum AuthResult {
    Authorized(Authenticated),
    Unauthorized(Response),
}

pub async fn open_context(req: &Request, env: &Env) -> Result<ContextResult> {
    let settings = match load_settings(env) {
        Ok(s) => s,
        Err(e) => return Ok(ContextResult::Failed(internal_error_response(req, "Invalid configuration", &e)?)),
    };
    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return Ok(ContextResult::Failed(internal_error_response(req, "Failed to open database connection", &e)?)),
    };
    Ok(ContextResult::Ready(Context { db, settings }))
}

/// Use the context the router already opened, if any.
pub async fn reuse_or_open(req: &Request, env: &Env, ctx: Option<Context>) -> Result<ContextResult> {
    match ctx {
        Some(ctx) => Ok(ContextResult::Ready(ctx)),
        None => open_context(req, env).await,
    }
}

/// Resolve the acting user from the access cookie or bearer header.
pub async fn authenticate(req: &Request, env: &Env) -> Result<AuthResult> {
    let ctx = match open_context(req, env).await? {
        ContextResult::Ready(ctx) => ctx,
        ContextResult::Failed(resp) => return Ok(AuthResult::Unauthorized(resp)),
    };

    let cookie = header(req, "Cookie")?;
    let authorization = header(req, "Authorization")?;
    let user = session::current_user(
        &ctx.db,
        &ctx.settings,
        cookie.as_deref(),
        authorization.as_deref(),
        now_ts(),
    )
    .await;

    match user {
        Ok(username) => Ok(AuthResult::Authorized(Authenticated { ctx, username })),
        Err(e) => Ok(AuthResult::Unauthorized(service_error_response(req, &e)?)),
    }
}
