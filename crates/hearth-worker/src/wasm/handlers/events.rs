use worker::{Env, Method, Request, Response, Result};

use crate::service::events::{self, NewEvent, RsvpUpdate};
use crate::worker_wasm::http::{invalid_json, json_response, method_not_allowed, respond, service_error_response};

use super::auth::{authenticate, AuthResult};

/// GET lists an organization's events (members); POST schedules one (owner).
pub async fn handle_organization_events(mut req: Request, env: &Env, org_id: String) -> Result<Response> {
    let method = req.method();
    if method != Method::Get && method != Method::Post {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    if method == Method::Get {
        return respond(&req, 200, events::org_events(&auth.ctx.db, &auth.username, &org_id).await);
    }

    let payload: NewEvent = match req.json().await {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "create_event", &e),
    };
    respond(
        &req,
        201,
        events::create_event(&auth.ctx.db, &auth.username, &org_id, payload).await,
    )
}

/// GET /api/events/<id>/
pub async fn handle_event(req: Request, env: &Env, event_id: String) -> Result<Response> {
    if req.method() != Method::Get {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    respond(&req, 200, events::get_event(&auth.ctx.db, &auth.username, &event_id).await)
}

/// PATCH /api/events/<id>/rsvp/ with `{"rsvp": "Y" | "N" | "M"}`. No body means `M`.
pub async fn handle_rsvp(mut req: Request, env: &Env, event_id: String) -> Result<Response> {
    if req.method() != Method::Patch {
        return method_not_allowed(&req);
    }

    let auth = match authenticate(&req, env).await? {
        AuthResult::Authorized(a) => a,
        AuthResult::Unauthorized(resp) => return Ok(resp),
    };

    let body = req.text().await?;
    let payload = match RsvpUpdate::from_body(&body) {
        Ok(p) => p,
        Err(e) => return invalid_json(&req, "rsvp", &e),
    };

    match events::rsvp(&auth.ctx.db, &auth.username, &event_id, payload.rsvp).await {
        Ok(rsvp) => json_response(&req, 200, &serde_json::json!({ "success": true, "new_rsvp": rsvp })),
        Err(e) => service_error_response(&req, &e),
    }
}
