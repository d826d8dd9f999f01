//! Social backend for Cloudflare Workers: users and followers, posts, organizations with
//! join requests, events with RSVPs, and a job board.
//!
//! Everything outside `worker_wasm` is target-agnostic and tested natively against SQLite.

pub mod config;
pub mod cookies;
pub mod crypto;
pub mod d1;
pub mod error;
pub mod jwt;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod service;
pub mod session;
pub mod throttle;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(target_arch = "wasm32")]
mod worker_wasm;

#[cfg(target_arch = "wasm32")]
pub use worker_wasm::*;
