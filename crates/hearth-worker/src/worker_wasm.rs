use worker::*;

#[path = "wasm/db/mod.rs"]
pub mod db;
#[path = "wasm/env.rs"]
pub mod env;
#[path = "wasm/handlers/mod.rs"]
pub mod handlers;
#[path = "wasm/http.rs"]
pub mod http;
#[path = "wasm/logging.rs"]
pub mod logging;

use crate::routes::{Route, Verb};
use handlers::Throttle;
use http::{json_with_cors, not_found};

fn verb(method: &Method) -> Verb {
    match method {
        Method::Get => Verb::Get,
        Method::Post => Verb::Post,
        Method::Put => Verb::Put,
        Method::Patch => Verb::Patch,
        Method::Delete => Verb::Delete,
        Method::Options => Verb::Options,
        _ => Verb::Other,
    }
}

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();
    logging::init_tracing(&env);

    if req.method() == Method::Options {
        let resp = Response::empty()?.with_status(204);
        return json_with_cors(&req, resp);
    }

    let url = req.url()?;
    let Some(route) = Route::resolve(url.path()) else {
        return not_found(&req);
    };

    let counted = match handlers::apply_login_throttle(&req, &env, verb(&req.method()), route.handler_name()).await? {
        Throttle::Exempt => None,
        Throttle::Passed(ctx) => Some(ctx),
        Throttle::Rejected(resp) => return Ok(resp),
    };

    use handlers::{accounts, admin, events, identity, jobs, migrations, organizations, posts};

    match route {
        Route::Health => {
            let body = serde_json::json!({
                "ok": true,
                "service": "hearth",
            });
            json_with_cors(&req, Response::from_json(&body)?)
        }
        Route::MigrationsUp if req.method() == Method::Post => migrations::handle_migrations_up(&req, &env).await,
        Route::DbPing if req.method() == Method::Get => admin::handle_db_ping(&req, &env).await,
        Route::MigrationsUp | Route::DbPing => http::method_not_allowed(&req),

        Route::Register => accounts::handle_register(req, &env).await,
        Route::Login => identity::handle_login(req, &env, counted).await,
        Route::TokenRefresh => identity::handle_token_refresh(req, &env, counted).await,
        Route::Logout => identity::handle_logout(req, &env).await,
        Route::Authenticated => accounts::handle_authenticated(req, &env).await,
        Route::CheckUsername => accounts::handle_check_username(req, &env).await,
        Route::UserProfile { username } => accounts::handle_user_profile(req, &env, username).await,
        Route::UpdateUser => accounts::handle_update_user(req, &env).await,
        Route::SearchUsers => accounts::handle_search_users(req, &env).await,
        Route::ToggleFollow => accounts::handle_toggle_follow(req, &env).await,

        Route::UserPosts { username } => posts::handle_user_posts(req, &env, username).await,
        Route::CreatePost => posts::handle_create_post(req, &env).await,
        Route::Feed => posts::handle_feed(req, &env).await,
        Route::ToggleLike => posts::handle_toggle_like(req, &env).await,

        Route::UserOrganizations => organizations::handle_user_organizations(req, &env).await,
        Route::OrganizationFeed => organizations::handle_organization_feed(req, &env).await,
        Route::AllOrganizations => organizations::handle_all_organizations(req, &env).await,
        Route::SearchOrganizations => organizations::handle_search(req, &env).await,
        Route::CreateOrganization => organizations::handle_create_organization(req, &env).await,
        Route::JoinOrganization { org_id } => organizations::handle_join(req, &env, org_id).await,
        Route::AcceptJoinRequest { org_id, username } => {
            organizations::handle_accept(req, &env, org_id, username).await
        }
        Route::Organization { org_id } => organizations::handle_organization(req, &env, org_id).await,
        Route::UpdateOrganization { org_id } => organizations::handle_update(req, &env, org_id).await,
        Route::RemoveMember { org_id, username } => {
            organizations::handle_remove_member(req, &env, org_id, username).await
        }
        Route::OrganizationPosts { org_id } => {
            organizations::handle_organization_posts(req, &env, org_id).await
        }
        Route::CreateOrgPost => organizations::handle_create_org_post(req, &env).await,
        Route::ToggleOrgPostLike => organizations::handle_toggle_org_post_like(req, &env).await,

        Route::OrganizationEvents { org_id } => events::handle_organization_events(req, &env, org_id).await,
        Route::Event { event_id } => events::handle_event(req, &env, event_id).await,
        Route::Rsvp { event_id } => events::handle_rsvp(req, &env, event_id).await,

        Route::Jobs => jobs::handle_jobs(req, &env).await,
        Route::Job { job_id } => jobs::handle_job(req, &env, job_id).await,
        Route::ApplyToJob { job_id } => jobs::handle_apply(req, &env, job_id).await,
        Route::JobApplications { job_id } => jobs::handle_applications(req, &env, job_id).await,
        Route::MyJobs => jobs::handle_my_jobs(req, &env).await,
    }
}
