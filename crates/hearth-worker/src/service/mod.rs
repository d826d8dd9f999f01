//! Domain operations. Every function here is target-agnostic and takes the database
//! connection explicitly; authorization is decided from the stored relations.

pub mod accounts;
pub mod events;
pub mod follows;
pub mod jobs;
pub mod org_posts;
pub mod organizations;
pub mod posts;
pub mod validate;
