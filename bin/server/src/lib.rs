//! flock HTTP server.
//!
//! Serves the ministry membership API. Every request is authenticated from a
//! session cookie, resolved to the caller's active scope, and checked by the
//! [`ScopeAuthorizer`](flock_authz::ScopeAuthorizer) before rows are read or
//! written.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
