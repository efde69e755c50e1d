//! # Panelview
//!
//! View-model service for a server-management panel. It keeps the state behind
//! two pages of the panel and serves it as JSON:
//!
//! - the **dashboard**: a user's servers in a user-defined, persisted order,
//!   optionally grouped into folders, with an admin toggle to list other
//!   users' servers
//! - the **file manager**: a remote directory filtered, naturally sorted,
//!   deduplicated and paginated, with bulk selection
//!
//! ## Core Components
//!
//! - [`config`]: Layered configuration (embedded defaults, files, environment)
//! - [`db`]: SQLite schema for the persisted key-value store
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`fetch`]: Upstream panel API access and response cache
//! - [`flash`]: Per-view user-visible error messages
//! - [`listing`]: Directory listing pipeline
//! - [`metrics`]: Counters exposed as JSON and Prometheus text
//! - [`middleware`]: Caller identity extraction
//! - [`order`]: Order reconciliation and scoped persistence
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state and per-user sessions
//! - [`storage`]: Durable key-value store backends
//! - [`types`]: Domain records, upstream wire format and request bodies
//! - [`views`]: Dashboard and file manager controllers

pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod flash;
pub mod listing;
pub mod metrics;
pub mod middleware;
pub mod order;
pub mod routes;
pub mod state;
pub mod storage;
pub mod types;
pub mod views;

#[cfg(test)]
mod tests;
