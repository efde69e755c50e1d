//! Request extractors shared by the route handlers.
//!
//! - `identity`: caller id and root-admin flag from the panel headers

pub mod identity;

pub use identity::PanelUser;
