//! Live support-chat engine for a sim-racing community site.
//!
//! This library provides the server-side chat core (durable chat store,
//! subscription registry, presence/typing tracking, WebSocket fan-out) and
//! the client-side session/cache logic that completes the protocol contract.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// client-side protocol counterpart
pub mod client;

// shared library
pub mod common;
