//! Shared utilities used by both the server and the client binaries.

pub mod logger;
pub mod time;
