//! # Status Board Common Library
//!
//! Data pipeline behind the brigade status dashboard:
//! - Brigade / project / tag model and wire decoding
//! - Slug generation and brigade normalization
//! - Project filters (activity, topics, text, brigade)
//! - Derived views (topic universe, leaderboard, tag map)
//! - Application state store with joint async loading
//! - Configuration loading
//! - SSE helper for store change events

pub mod config;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod model;
pub mod normalize;
pub mod slug;
pub mod sse;
pub mod store;
pub mod time;
pub mod views;

pub use error::{Error, FetchTarget, Result};
pub use fetch::{DataSource, HttpDataSource};
pub use store::{LoadOutcome, LoadState, Store, StoreEvent, StoreStatus};
