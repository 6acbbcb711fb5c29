//! Terminal client: HTTP calls, the push socket and the local snapshot
//! cache that keeps the last known chat state usable offline.

mod cache;
mod error;
mod formatter;
mod session;

pub use cache::{CacheReconciler, MemoryCache, OpenOutcome, SnapshotCache};
pub use error::ClientError;
pub use session::{SessionConfig, run_session};
