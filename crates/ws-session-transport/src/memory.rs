//! In-process channel-backed transport.

use async_trait::async_trait;
use tokio::sync::mpsc;

use ws_session_core::{
    CloseStatus, Frame, FrameKind, Transport, TransportError, TransportState,
};

/// In-process transport half handed to a session driver.
///
/// Useful for development and tests. Frames travel over unbounded channels;
/// the peer half can fragment deliberately to exercise accumulation. A
/// dropped or closed peer surfaces as a close frame, matching how a real
/// transport reports a peer-initiated close.
pub struct MemoryTransport {
    incoming: mpsc::UnboundedReceiver<Frame>,
    outgoing: mpsc::UnboundedSender<Frame>,
    state: TransportState,
}

/// The far end of a [`MemoryTransport`] pair, driven by the test or the
/// embedding application.
pub struct MemoryPeer {
    tx: mpsc::UnboundedSender<Frame>,
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl MemoryTransport {
    /// Create a connected-in-waiting transport/peer pair.
    ///
    /// The transport reports `Closed` until `connect` is called.
    #[must_use]
    pub fn pair() -> (Self, MemoryPeer) {
        let (peer_tx, transport_rx) = mpsc::unbounded_channel();
        let (transport_tx, peer_rx) = mpsc::unbounded_channel();

        let transport = Self {
            incoming: transport_rx,
            outgoing: transport_tx,
            state: TransportState::Closed,
        };
        let peer = MemoryPeer {
            tx: peer_tx,
            rx: peer_rx,
        };
        (transport, peer)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&mut self, _url: &str) -> Result<(), TransportError> {
        if self.state == TransportState::Open {
            return Ok(());
        }
        if self.outgoing.is_closed() {
            return Err(TransportError::ConnectFailed("peer is gone".into()));
        }
        self.state = TransportState::Open;
        Ok(())
    }

    async fn receive(&mut self, _max_len: usize) -> Result<Frame, TransportError> {
        if self.state == TransportState::Closed {
            return Err(TransportError::NotOpen);
        }
        match self.incoming.recv().await {
            Some(frame) => {
                if frame.kind == FrameKind::Close {
                    self.state = TransportState::Closing;
                }
                Ok(frame)
            }
            None => {
                // Peer dropped; report it the way a socket would.
                self.state = TransportState::Closed;
                Ok(Frame::close(Some(CloseStatus::normal())))
            }
        }
    }

    async fn send(
        &mut self,
        payload: &[u8],
        kind: FrameKind,
        is_final: bool,
    ) -> Result<(), TransportError> {
        if self.state != TransportState::Open {
            return Err(TransportError::NotOpen);
        }
        let frame = match kind {
            FrameKind::Text => {
                let text = std::str::from_utf8(payload)
                    .map_err(|e| TransportError::Protocol(e.to_string()))?;
                Frame::text_fragment(text, is_final)
            }
            FrameKind::Binary => Frame::binary_fragment(payload.to_vec(), is_final),
            FrameKind::Close => Frame::close(None),
        };
        self.outgoing
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self, status: CloseStatus) -> Result<(), TransportError> {
        if self.state == TransportState::Open || self.state == TransportState::Closing {
            let _ = self.outgoing.send(Frame::close(Some(status)));
        }
        self.state = TransportState::Closed;
        Ok(())
    }

    fn state(&self) -> TransportState {
        self.state
    }
}

impl MemoryPeer {
    /// Push a frame toward the session. Returns `false` once the transport
    /// is gone.
    pub fn send(&self, frame: Frame) -> bool {
        self.tx.send(frame).is_ok()
    }

    /// Push one complete text frame toward the session.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(Frame::text(text))
    }

    /// Push a close frame toward the session.
    pub fn close(&self, status: Option<CloseStatus>) -> bool {
        self.send(Frame::close(status))
    }

    /// Receive the next frame the session sent, or `None` once the
    /// transport is gone.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}
