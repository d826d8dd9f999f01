pub mod user;
pub mod follow;
pub mod organization;
pub mod organization_member;
pub mod join_request;
pub mod post;
pub mod post_like;
pub mod org_post;
pub mod org_post_like;
pub mod event;
pub mod event_attendance;
pub mod job;
pub mod job_application;
pub mod throttle_bucket;

pub use user::Entity as User;
pub use follow::Entity as Follow;
pub use organization::Entity as Organization;
pub use organization_member::Entity as OrganizationMember;
pub use join_request::Entity as JoinRequest;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use org_post::Entity as OrgPost;
pub use org_post_like::Entity as OrgPostLike;
pub use event::Entity as Event;
pub use event_attendance::Entity as EventAttendance;
pub use job::Entity as Job;
pub use job_application::Entity as JobApplication;
pub use throttle_bucket::Entity as ThrottleBucket;
