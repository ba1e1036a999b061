//! Core chat client: configuration, backend protocol, and session state.
//!
//! This crate has no UI dependencies. It provides:
//! - `config`: `${BANTER_HOME}/config.toml` loading and persistence
//! - `client`: HTTP client for the streaming chat endpoint
//! - `stream`: incremental line parser for the `data: ` event protocol
//! - `session`: conversation and stream state owned by the UI session
//! - `turn`: async driver that pumps a response stream into an event channel

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod session;
pub mod stream;
pub mod turn;
