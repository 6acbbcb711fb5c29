//! Concrete implementations of the domain seams: storage, subscription
//! registry, presence tracking, WebSocket fan-out and wire DTOs.

pub mod dispatcher;
pub mod dto;
pub mod presence;
pub mod registry;
pub mod repository;

pub use dispatcher::WsDispatcher;
pub use presence::{PresenceTracker, TYPING_EXPIRY};
pub use registry::{Subscription, SubscriptionRegistry};
pub use repository::InMemoryChatRepository;
