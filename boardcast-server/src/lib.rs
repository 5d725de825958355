//! # Boardcast Server Library
//!
//! This library provides the core functionality for the Boardcast server:
//! the board-scoped event relay, the mutation coordinator, and the HTTP
//! and websocket surfaces.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `coordinator`: Mutation validation, persistence, and event publication
//! - `error`: Error handling and HTTP response mapping
//! - `hub`: Room-scoped event relay
//! - `routes`: API route handlers
//! - `ws`: Websocket event channel

pub mod app;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hub;
pub mod routes;
pub mod ws;
