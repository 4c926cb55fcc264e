//! Trait seams at the transport and application boundaries.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::LogicalMessage;
use crate::status::SessionStatus;

/// Normal-closure close code (RFC 6455 section 7.4.1).
pub const CLOSE_NORMAL: u16 = 1000;

/// Frame kind as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// UTF-8 text payload.
    Text,
    /// Raw binary payload.
    Binary,
    /// Protocol-level close notification.
    Close,
}

/// Close status carried on a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseStatus {
    /// Close code (RFC 6455 semantics for WebSocket transports).
    pub code: u16,
    /// Human-readable close reason, possibly empty.
    pub reason: String,
}

impl CloseStatus {
    /// Normal closure with no reason text.
    #[must_use]
    pub fn normal() -> Self {
        Self {
            code: CLOSE_NORMAL,
            reason: String::new(),
        }
    }

    /// Close status with a reason string.
    #[must_use]
    pub fn with_reason(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// One transport-level unit of a logical message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload kind.
    pub kind: FrameKind,
    /// Frame payload; empty for close frames without a reason body.
    pub payload: Bytes,
    /// Whether this frame completes the logical message.
    pub is_final: bool,
    /// Close status, present only on close frames.
    pub close_status: Option<CloseStatus>,
}

impl Frame {
    /// Complete (final) text frame.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::text_fragment(text, true)
    }

    /// Text fragment with an explicit final flag.
    #[must_use]
    pub fn text_fragment(text: impl Into<String>, is_final: bool) -> Self {
        Self {
            kind: FrameKind::Text,
            payload: Bytes::from(text.into()),
            is_final,
            close_status: None,
        }
    }

    /// Complete (final) binary frame.
    #[must_use]
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::binary_fragment(payload, true)
    }

    /// Binary fragment with an explicit final flag.
    #[must_use]
    pub fn binary_fragment(payload: impl Into<Bytes>, is_final: bool) -> Self {
        Self {
            kind: FrameKind::Binary,
            payload: payload.into(),
            is_final,
            close_status: None,
        }
    }

    /// Close frame with an optional close status.
    #[must_use]
    pub fn close(status: Option<CloseStatus>) -> Self {
        Self {
            kind: FrameKind::Close,
            payload: Bytes::new(),
            is_final: true,
            close_status: status,
        }
    }
}

/// Transport connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Connection attempt in progress.
    Connecting,
    /// Connected and able to exchange frames.
    Open,
    /// Close initiated but not yet complete.
    Closing,
    /// Fully closed or never connected.
    Closed,
}

/// Transport boundary error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    ConnectFailed(String),
    #[error("Transport is not open")]
    NotOpen,
    #[error("Transport closed by peer")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Bidirectional message transport consumed by the session driver.
///
/// Implementations own the socket/handshake mechanics; the driver only
/// sees frames and a connection state.
#[async_trait]
pub trait Transport: Send {
    /// Establish the connection.
    async fn connect(&mut self, url: &str) -> Result<(), TransportError>;

    /// Receive the next frame.
    ///
    /// `max_len` is a read-size hint for buffer-oriented transports;
    /// message-oriented transports deliver whole frames and may ignore it.
    /// A peer-initiated close surfaces as a `FrameKind::Close` frame, not
    /// as an error.
    async fn receive(&mut self, max_len: usize) -> Result<Frame, TransportError>;

    /// Send one frame.
    async fn send(
        &mut self,
        payload: &[u8],
        kind: FrameKind,
        is_final: bool,
    ) -> Result<(), TransportError>;

    /// Gracefully close the outbound direction.
    async fn close(&mut self, status: CloseStatus) -> Result<(), TransportError>;

    /// Current connection state.
    fn state(&self) -> TransportState;
}

/// Per-session application hooks.
///
/// Supplied per session, never registered globally. All methods are invoked
/// synchronously on the driver's own execution context, so the return value
/// can gate the very next protocol step; long-running work belongs on
/// another task.
pub trait SessionHooks: Send {
    /// Lifecycle checkpoint reached. Returning `false` vetoes continuation
    /// and routes the session to teardown.
    fn on_status(&mut self, status: SessionStatus) -> bool {
        let _ = status;
        true
    }

    /// Supply the outbound credential payload, or decline by returning
    /// `None`. Called only when the session requires a login handshake.
    fn on_login(&mut self) -> Option<String> {
        None
    }

    /// Dispatch a completed logical message; an optional reply is sent back
    /// as one text message.
    fn on_message(&mut self, message: LogicalMessage) -> Option<String> {
        let _ = message;
        None
    }
}
