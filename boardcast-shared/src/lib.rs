//! # Boardcast Shared Library
//!
//! This crate contains the types and database operations shared between
//! the Boardcast server and the client-side synchronization library.
//!
//! ## Module Organization
//!
//! - `models`: Database models (boards, lists, tasks, activities)
//! - `events`: Typed board events and the websocket wire protocol
//! - `db`: Connection pool and migration helpers

pub mod db;
pub mod events;
pub mod models;

/// Current version of the Boardcast shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
