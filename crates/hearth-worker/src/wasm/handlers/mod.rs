pub mod accounts;
pub mod admin;
pub mod admin_auth;
pub mod auth;
pub mod events;
pub mod identity;
pub mod jobs;
pub mod migrations;
pub mod organizations;
pub mod posts;

use worker::{Env, Request, Response, Result};

use crate::routes::Verb;
use crate::throttle;
use crate::util::now_ts;
use crate::worker_wasm::http::service_error_response;

use auth::{open_context, Context, ContextResult};

pub enum Throttle {
    /// Not a credential endpoint.
    Exempt,
    /// Counted; the handler reuses the context opened for the check.
    Passed(Context),
    Rejected(Response),
}

/// Count a request against the global login bucket when the route is a credential
/// endpoint.
pub async fn apply_login_throttle(req: &Request, env: &Env, verb: Verb, handler_name: &str) -> Result<Throttle> {
    let Some(key) = throttle::login_cache_key(verb, handler_name) else {
        return Ok(Throttle::Exempt);
    };

    let ctx = match open_context(req, env).await? {
        ContextResult::Ready(ctx) => ctx,
        ContextResult::Failed(resp) => return Ok(Throttle::Rejected(resp)),
    };

    match throttle::hit(&ctx.db, &key, ctx.settings.login_rate, now_ts()).await {
        Ok(()) => Ok(Throttle::Passed(ctx)),
        Err(e) => Ok(Throttle::Rejected(service_error_response(req, &e)?)),
    }
}
