//! Transport implementations and shared primitives.
//!
//! Provides:
//! - Send/receive helpers shared by client and server roles
//! - In-process channel-backed transport (development and tests)
//! - WebSocket client transport (feature: websocket)

pub mod memory;
pub mod primitives;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use memory::{MemoryPeer, MemoryTransport};

#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;
