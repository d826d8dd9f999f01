//! Route table for the HTTP surface.
//!
//! Matching is on the path only; each handler answers 405 for verbs it does not serve.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Health,
    MigrationsUp,
    DbPing,

    Register,
    Login,
    TokenRefresh,
    Logout,
    Authenticated,
    CheckUsername,
    UserProfile { username: String },
    UpdateUser,
    SearchUsers,
    ToggleFollow,

    UserPosts { username: String },
    CreatePost,
    Feed,
    ToggleLike,

    UserOrganizations,
    OrganizationFeed,
    AllOrganizations,
    SearchOrganizations,
    CreateOrganization,
    JoinOrganization { org_id: String },
    AcceptJoinRequest { org_id: String, username: String },
    Organization { org_id: String },
    UpdateOrganization { org_id: String },
    RemoveMember { org_id: String, username: String },
    OrganizationPosts { org_id: String },
    CreateOrgPost,
    ToggleOrgPostLike,

    OrganizationEvents { org_id: String },
    Event { event_id: String },
    Rsvp { event_id: String },

    Jobs,
    Job { job_id: String },
    ApplyToJob { job_id: String },
    JobApplications { job_id: String },
    MyJobs,
}

impl Route {
    pub fn resolve(path: &str) -> Option<Route> {
        match path {
            "/health" => return Some(Route::Health),
            "/v1/admin/migrations/up" => return Some(Route::MigrationsUp),
            "/v1/admin/db/ping" => return Some(Route::DbPing),
            _ => {}
        }

        let rest = path.strip_prefix("/api/")?;
        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        let route = match segments.as_slice() {
            ["register"] => Route::Register,
            ["login"] | ["token"] => Route::Login,
            ["token", "refresh"] => Route::TokenRefresh,
            ["logout"] => Route::Logout,
            ["authenticated"] => Route::Authenticated,
            ["check-username"] => Route::CheckUsername,
            ["user_data", username] => Route::UserProfile { username: username.to_string() },
            ["update_user"] => Route::UpdateUser,
            ["search"] => Route::SearchUsers,
            ["toggle_follow"] => Route::ToggleFollow,

            ["posts", username] => Route::UserPosts { username: username.to_string() },
            ["create_post"] => Route::CreatePost,
            ["get_posts"] => Route::Feed,
            ["toggleLike"] => Route::ToggleLike,

            ["organization", "user"] => Route::UserOrganizations,
            ["organization", "feed"] => Route::OrganizationFeed,
            ["organization", "all"] => Route::AllOrganizations,
            ["organization", "create"] => Route::CreateOrganization,
            ["search_organizations"] => Route::SearchOrganizations,
            ["organization", "join", org_id] => Route::JoinOrganization { org_id: org_id.to_string() },
            ["organization", "accept", org_id, username] => Route::AcceptJoinRequest {
                org_id: org_id.to_string(),
                username: username.to_string(),
            },
            ["organization", "posts", org_id] => Route::OrganizationPosts { org_id: org_id.to_string() },
            ["organization", org_id] => Route::Organization { org_id: org_id.to_string() },
            ["organization", org_id, "update"] => Route::UpdateOrganization { org_id: org_id.to_string() },
            ["organization", org_id, "members", username] => Route::RemoveMember {
                org_id: org_id.to_string(),
                username: username.to_string(),
            },
            ["organization", org_id, "events"] => Route::OrganizationEvents { org_id: org_id.to_string() },
            ["create_org_post"] => Route::CreateOrgPost,
            ["toggleOrgPostLike"] => Route::ToggleOrgPostLike,

            ["events", event_id] => Route::Event { event_id: event_id.to_string() },
            ["events", event_id, "rsvp"] => Route::Rsvp { event_id: event_id.to_string() },

            ["jobs"] => Route::Jobs,
            ["my-jobs"] => Route::MyJobs,
            ["jobs", job_id] => Route::Job { job_id: job_id.to_string() },
            ["jobs", job_id, "apply"] => Route::ApplyToJob { job_id: job_id.to_string() },
            ["jobs", job_id, "applications"] => Route::JobApplications { job_id: job_id.to_string() },

            _ => return None,
        };

        Some(route)
    }

    /// Stable handler name, used for logging and throttle selection.
    pub fn handler_name(&self) -> &'static str {
        match self {
            Route::Health => "health",
            Route::MigrationsUp => "migrations_up",
            Route::DbPing => "db_ping",
            Route::Register => "register",
            Route::Login => "login",
            Route::TokenRefresh => "token_refresh",
            Route::Logout => "logout",
            Route::Authenticated => "authenticated",
            Route::CheckUsername => "check_username",
            Route::UserProfile { .. } => "get_user_profile_data",
            Route::UpdateUser => "update_user_details",
            Route::SearchUsers => "search_users",
            Route::ToggleFollow => "toggle_follow",
            Route::UserPosts { .. } => "get_users_posts",
            Route::CreatePost => "create_post",
            Route::Feed => "get_posts",
            Route::ToggleLike => "toggle_like",
            Route::UserOrganizations => "get_user_organizations",
            Route::OrganizationFeed => "get_organization_feed",
            Route::AllOrganizations => "get_all_organizations",
            Route::SearchOrganizations => "search_organizations",
            Route::CreateOrganization => "create_organization",
            Route::JoinOrganization { .. } => "request_to_join_organization",
            Route::AcceptJoinRequest { .. } => "accept_join_request",
            Route::Organization { .. } => "get_organization",
            Route::UpdateOrganization { .. } => "update_organization",
            Route::RemoveMember { .. } => "remove_member",
            Route::OrganizationPosts { .. } => "get_organization_posts",
            Route::CreateOrgPost => "create_org_post",
            Route::ToggleOrgPostLike => "toggle_org_post_like",
            Route::OrganizationEvents { .. } => "organization_events",
            Route::Event { .. } => "get_event",
            Route::Rsvp { .. } => "update_rsvp",
            Route::Jobs => "jobs",
            Route::Job { .. } => "job_detail",
            Route::ApplyToJob { .. } => "apply_to_job",
            Route::JobApplications { .. } => "job_applications",
            Route::MyJobs => "my_jobs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::login_cache_key;

    #[test]
    fn resolves_static_routes() {
        assert_eq!(Route::resolve("/health"), Some(Route::Health));
        assert_eq!(Route::resolve("/api/register/"), Some(Route::Register));
        assert_eq!(Route::resolve("/api/token/"), Some(Route::Login));
        assert_eq!(Route::resolve("/api/login/"), Some(Route::Login));
        assert_eq!(Route::resolve("/api/token/refresh/"), Some(Route::TokenRefresh));
        assert_eq!(Route::resolve("/api/organization/user/"), Some(Route::UserOrganizations));
        assert_eq!(Route::resolve("/api/organization/create/"), Some(Route::CreateOrganization));
        assert_eq!(Route::resolve("/api/my-jobs/"), Some(Route::MyJobs));
    }

    #[test]
    fn trailing_slash_is_optional() {
        assert_eq!(Route::resolve("/api/jobs"), Some(Route::Jobs));
        assert_eq!(Route::resolve("/api/jobs/"), Some(Route::Jobs));
    }

    #[test]
    fn resolves_parameterized_routes() {
        assert_eq!(
            Route::resolve("/api/organization/accept/org-1/bob/"),
            Some(Route::AcceptJoinRequest {
                org_id: "org-1".to_string(),
                username: "bob".to_string()
            })
        );
        assert_eq!(
            Route::resolve("/api/organization/org-1/"),
            Some(Route::Organization { org_id: "org-1".to_string() })
        );
        assert_eq!(
            Route::resolve("/api/organization/org-1/events/"),
            Some(Route::OrganizationEvents { org_id: "org-1".to_string() })
        );
        assert_eq!(
            Route::resolve("/api/events/ev-9/rsvp/"),
            Some(Route::Rsvp { event_id: "ev-9".to_string() })
        );
        assert_eq!(
            Route::resolve("/api/jobs/j1/applications/"),
            Some(Route::JobApplications { job_id: "j1".to_string() })
        );
    }

    #[test]
    fn rejects_unknown_paths() {
        assert_eq!(Route::resolve("/register/"), None);
        assert_eq!(Route::resolve("/api/"), None);
        assert_eq!(Route::resolve("/api//jobs/"), None);
        assert_eq!(Route::resolve("/api/jobs/a/b/c/"), None);
    }

    #[test]
    fn only_credential_routes_hit_the_login_throttle() {
        let throttled = |path: &str, verb: Verb| {
            let route = Route::resolve(path).unwrap();
            login_cache_key(verb, route.handler_name()).is_some()
        };

        assert!(throttled("/api/token/", Verb::Post));
        assert!(throttled("/api/login/", Verb::Post));
        assert!(throttled("/api/token/refresh/", Verb::Post));
        assert!(!throttled("/api/authenticated/", Verb::Get));
        assert!(!throttled("/api/register/", Verb::Post));
        assert!(!throttled("/api/organization/join/x/", Verb::Post));
    }
}
