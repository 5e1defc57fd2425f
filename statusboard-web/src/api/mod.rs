//! HTTP API handlers for statusboard-web

pub mod buildinfo;
pub mod error;
pub mod filters;
pub mod health;
pub mod projects;
pub mod refresh;
pub mod sse;
pub mod views;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use filters::{get_filters, patch_filters};
pub use health::health_routes;
pub use projects::{get_available_topics, get_projects, get_projects_by_slug};
pub use refresh::refresh;
pub use sse::event_stream;
pub use views::{get_brigades, get_leaders, get_status, get_tags, get_topics};
