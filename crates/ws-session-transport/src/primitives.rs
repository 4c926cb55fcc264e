//! Thin send/receive helpers shared by transports and the session driver.
//!
//! Failures here are caught, logged, and converted to booleans; nothing
//! propagates past this boundary.

use ws_session_core::{Frame, FrameKind, Signal, Transport, TransportState};

/// Whether the received frame or the session's cancel signal says the
/// connection is going away. Any one condition suffices: a close frame, a
/// close status on the frame, or an already-raised cancel signal.
#[must_use]
pub fn is_closing(frame: &Frame, cancel: &Signal) -> bool {
    frame.kind == FrameKind::Close || frame.close_status.is_some() || cancel.is_raised()
}

/// Append a received text frame to `buffer` on a text-only path.
///
/// For embeddings that speak text frames exclusively and keep their own
/// buffer; the session driver assembles mixed text and binary traffic
/// through `MessageAccumulator` instead.
///
/// Declines (returns `false`) when the connection is closing. A non-text
/// frame is logged and discarded without aborting the session.
pub fn append_text_frame(frame: &Frame, buffer: &mut String, cancel: &Signal) -> bool {
    if is_closing(frame, cancel) {
        return false;
    }
    if frame.kind != FrameKind::Text {
        tracing::warn!(kind = ?frame.kind, "Discarding non-text frame on text-only path");
        return false;
    }
    match std::str::from_utf8(&frame.payload) {
        Ok(text) => {
            buffer.push_str(text);
            true
        }
        Err(e) => {
            tracing::warn!("Discarding undecodable text frame: {e}");
            false
        }
    }
}

/// Send `message` as one complete, final UTF-8 text frame.
///
/// Rejects an empty message, a non-open transport, or an already-raised
/// cancel signal up front without touching the transport. Transport errors
/// are logged and reported as `false`.
pub async fn send_text<T>(transport: &mut T, message: &str, cancel: &Signal) -> bool
where
    T: Transport + ?Sized,
{
    if message.is_empty() {
        tracing::debug!("Refusing to send an empty message");
        return false;
    }
    if transport.state() != TransportState::Open {
        tracing::debug!(state = ?transport.state(), "Refusing to send on a non-open transport");
        return false;
    }
    if cancel.is_raised() {
        tracing::debug!("Refusing to send after cancellation");
        return false;
    }

    match transport.send(message.as_bytes(), FrameKind::Text, true).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Send failed: {e}");
            false
        }
    }
}
