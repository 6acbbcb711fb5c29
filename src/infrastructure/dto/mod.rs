//! Data Transfer Objects for the two protocols the engine speaks.
//!
//! - `http`: REST request/response bodies (camelCase on the wire)
//! - `websocket`: push-protocol frames (tagged by `type`)
//! - `conversion`: domain ↔ DTO mapping

pub mod conversion;
pub mod http;
pub mod websocket;
