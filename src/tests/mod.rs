//! Unit and HTTP tests for panelview.
//!
//! ## Test Modules
//!
//! - **order_tests**: reconciliation, reordering and persisted order loading
//! - **listing_tests**: the directory listing pipeline
//! - **storage_tests**: SQLite schema and key-value store backends
//! - **fetch_tests**: response cache, upstream status mapping and wire records
//! - **view_tests**: dashboard and file manager controllers
//! - **api_tests**: dashboard and file manager endpoints
//! - **health_api_tests**: health, metrics and version endpoints
//! - **error_tests**: error mapping and input validation
//! - **config_tests**: configuration loading and validation
//!
//! Run a single module with `cargo test order_tests`.

pub(crate) mod support;

pub mod config_tests;
pub mod order_tests;
pub mod storage_tests;
