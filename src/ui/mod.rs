//! HTTP and WebSocket surface of the support chat engine.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, build_router};
