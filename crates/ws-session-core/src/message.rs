//! Assembly of logical messages from transport frames.

use bytes::BytesMut;
use thiserror::Error;

use crate::traits::FrameKind;

/// Error raised while assembling a logical message.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("{arrived:?} frame appended to an in-progress {current} message")]
    MixedKinds {
        arrived: FrameKind,
        current: &'static str,
    },
    #[error("Invalid UTF-8 in text frame: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// A completed application-level message.
///
/// The payload is either text or binary, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalMessage {
    /// UTF-8 text payload.
    Text(String),
    /// Raw binary payload.
    Binary(Vec<u8>),
}

impl LogicalMessage {
    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the payload is binary.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Text payload, if this is a text message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Raw payload bytes, regardless of kind.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

#[derive(Debug, Default)]
enum Buffer {
    #[default]
    Empty,
    Text(String),
    Binary(BytesMut),
}

/// Assembles one logical message out of one or more frames.
///
/// Owned by a single session loop; the internal storage is never exposed.
/// Consumption (via [`MessageAccumulator::take`]) is the caller's explicit
/// responsibility once a frame marked final has been populated.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    buffer: Buffer,
}

impl MessageAccumulator {
    /// Create an empty, untyped accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear accumulated state back to empty/untyped.
    pub fn reset(&mut self) {
        self.buffer = Buffer::Empty;
    }

    /// Append one frame's payload to the in-progress message.
    ///
    /// Returns `Ok(true)` when the payload was appended, `Ok(false)` for a
    /// close/control frame (no mutation). An empty frame is a valid no-op
    /// append. The frame's final flag is the caller's concern.
    ///
    /// # Errors
    /// Returns [`MessageError::MixedKinds`] when the frame kind does not
    /// match the in-progress message (previous payload left intact), or
    /// [`MessageError::InvalidUtf8`] for an undecodable text frame.
    pub fn populate(&mut self, kind: FrameKind, payload: &[u8]) -> Result<bool, MessageError> {
        match kind {
            FrameKind::Close => Ok(false),
            FrameKind::Text => {
                let text = std::str::from_utf8(payload)?;
                match &mut self.buffer {
                    Buffer::Empty => self.buffer = Buffer::Text(text.to_owned()),
                    Buffer::Text(existing) => existing.push_str(text),
                    Buffer::Binary(_) => {
                        return Err(MessageError::MixedKinds {
                            arrived: kind,
                            current: "binary",
                        });
                    }
                }
                Ok(true)
            }
            FrameKind::Binary => {
                match &mut self.buffer {
                    Buffer::Empty => self.buffer = Buffer::Binary(BytesMut::from(payload)),
                    Buffer::Binary(existing) => existing.extend_from_slice(payload),
                    Buffer::Text(_) => {
                        return Err(MessageError::MixedKinds {
                            arrived: kind,
                            current: "text",
                        });
                    }
                }
                Ok(true)
            }
        }
    }

    /// Byte length of the accumulated payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.buffer {
            Buffer::Empty => 0,
            Buffer::Text(text) => text.len(),
            Buffer::Binary(bytes) => bytes.len(),
        }
    }

    /// Whether nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.buffer, Buffer::Empty)
    }

    /// Whether the in-progress message is binary.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self.buffer, Buffer::Binary(_))
    }

    /// Take the completed message, resetting the accumulator.
    ///
    /// Returns `None` when nothing has been accumulated.
    #[must_use]
    pub fn take(&mut self) -> Option<LogicalMessage> {
        match std::mem::take(&mut self.buffer) {
            Buffer::Empty => None,
            Buffer::Text(text) => Some(LogicalMessage::Text(text)),
            Buffer::Binary(bytes) => Some(LogicalMessage::Binary(bytes.to_vec())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fragments_concatenate_in_order() {
        let mut acc = MessageAccumulator::new();
        assert!(acc.populate(FrameKind::Text, b"hello, ").unwrap());
        assert!(acc.populate(FrameKind::Text, b"world").unwrap());

        assert_eq!(acc.len(), 12);
        assert!(!acc.is_binary());
        assert_eq!(
            acc.take(),
            Some(LogicalMessage::Text("hello, world".into()))
        );
    }

    #[test]
    fn binary_fragments_concatenate_in_order() {
        let mut acc = MessageAccumulator::new();
        assert!(acc.populate(FrameKind::Binary, &[1, 2]).unwrap());
        assert!(acc.populate(FrameKind::Binary, &[3]).unwrap());

        assert!(acc.is_binary());
        assert_eq!(acc.take(), Some(LogicalMessage::Binary(vec![1, 2, 3])));
    }

    #[test]
    fn mixing_kinds_is_rejected_without_corruption() {
        let mut acc = MessageAccumulator::new();
        acc.populate(FrameKind::Text, b"keep me").unwrap();

        let err = acc.populate(FrameKind::Binary, &[0xff]).unwrap_err();
        assert!(matches!(err, MessageError::MixedKinds { .. }));

        // Previously accumulated payload intact.
        assert_eq!(acc.take(), Some(LogicalMessage::Text("keep me".into())));
    }

    #[test]
    fn binary_then_text_is_rejected_too() {
        let mut acc = MessageAccumulator::new();
        acc.populate(FrameKind::Binary, &[9]).unwrap();

        let err = acc.populate(FrameKind::Text, b"nope").unwrap_err();
        assert!(matches!(err, MessageError::MixedKinds { .. }));
        assert_eq!(acc.take(), Some(LogicalMessage::Binary(vec![9])));
    }

    #[test]
    fn close_frame_is_not_populated() {
        let mut acc = MessageAccumulator::new();
        assert!(!acc.populate(FrameKind::Close, b"").unwrap());
        assert!(acc.is_empty());
    }

    #[test]
    fn empty_frame_is_a_valid_noop_append() {
        let mut acc = MessageAccumulator::new();
        assert!(acc.populate(FrameKind::Text, b"").unwrap());
        assert_eq!(acc.len(), 0);
        // The message is typed even though it is empty.
        assert_eq!(acc.take(), Some(LogicalMessage::Text(String::new())));
    }

    #[test]
    fn reset_yields_empty_untyped_state() {
        let mut acc = MessageAccumulator::new();
        acc.populate(FrameKind::Binary, &[1, 2, 3]).unwrap();

        acc.reset();
        assert!(acc.is_empty());
        assert_eq!(acc.len(), 0);
        assert!(!acc.is_binary());
        assert!(acc.take().is_none());
    }

    #[test]
    fn invalid_utf8_text_frame_is_an_error() {
        let mut acc = MessageAccumulator::new();
        let err = acc.populate(FrameKind::Text, &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, MessageError::InvalidUtf8(_)));
        assert!(acc.is_empty());
    }

    #[test]
    fn logical_message_accessors() {
        let text = LogicalMessage::Text("abc".into());
        assert_eq!(text.len(), 3);
        assert!(!text.is_binary());
        assert_eq!(text.as_text(), Some("abc"));
        assert_eq!(text.as_bytes(), b"abc");

        let binary = LogicalMessage::Binary(vec![0, 1]);
        assert!(binary.is_binary());
        assert!(binary.as_text().is_none());
        assert_eq!(binary.len(), 2);
    }
}
