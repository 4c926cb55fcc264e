//! Core abstractions for the WebSocket session engine.
//!
//! This crate provides the fundamental building blocks:
//! - `MessageAccumulator` / `LogicalMessage` - frame-to-message assembly
//! - `SessionStatus` - lifecycle checkpoints
//! - `SessionConfig` - immutable per-connection settings
//! - `Signal` - one-shot lifecycle and cancellation signals
//! - Transport and hooks traits

pub mod config;
pub mod login;
pub mod message;
pub mod signal;
pub mod status;
pub mod traits;

pub use config::SessionConfig;
pub use login::LoginResult;
pub use message::{LogicalMessage, MessageAccumulator};
pub use signal::Signal;
pub use status::SessionStatus;
pub use traits::{
    CloseStatus, Frame, FrameKind, SessionHooks, Transport, TransportError, TransportState,
};
