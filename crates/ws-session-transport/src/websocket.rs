//! WebSocket client transport over `tokio-tungstenite`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use ws_session_core::{
    CloseStatus, Frame, FrameKind, Transport, TransportError, TransportState,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client-side WebSocket transport.
///
/// The library reassembles fragmented messages and answers pings, so every
/// received data frame arrives complete and final.
pub struct WebSocketTransport {
    stream: Option<WsStream>,
    state: TransportState,
}

impl WebSocketTransport {
    /// Create an unconnected transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: None,
            state: TransportState::Closed,
        }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        self.state = TransportState::Connecting;
        match connect_async(url).await {
            Ok((stream, _response)) => {
                self.stream = Some(stream);
                self.state = TransportState::Open;
                Ok(())
            }
            Err(e) => {
                self.state = TransportState::Closed;
                Err(TransportError::ConnectFailed(e.to_string()))
            }
        }
    }

    async fn receive(&mut self, _max_len: usize) -> Result<Frame, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotOpen)?;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Frame::text(text.as_str())),
                Some(Ok(Message::Binary(payload))) => return Ok(Frame::binary(payload)),
                Some(Ok(Message::Close(close))) => {
                    self.state = TransportState::Closing;
                    return Ok(Frame::close(close.map(|c| {
                        CloseStatus::with_reason(u16::from(c.code), c.reason.to_string())
                    })));
                }
                // Control frames the library already handles.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    self.state = TransportState::Closed;
                    return Ok(Frame::close(None));
                }
                Some(Err(e)) => {
                    self.state = TransportState::Closed;
                    return Err(TransportError::Protocol(e.to_string()));
                }
            }
        }
    }

    async fn send(
        &mut self,
        payload: &[u8],
        kind: FrameKind,
        _is_final: bool,
    ) -> Result<(), TransportError> {
        if self.state != TransportState::Open {
            return Err(TransportError::NotOpen);
        }
        let stream = self.stream.as_mut().ok_or(TransportError::NotOpen)?;

        let message = match kind {
            FrameKind::Text => {
                let text = std::str::from_utf8(payload)
                    .map_err(|e| TransportError::Protocol(e.to_string()))?;
                Message::Text(text.into())
            }
            FrameKind::Binary => Message::Binary(Bytes::copy_from_slice(payload)),
            FrameKind::Close => Message::Close(None),
        };

        stream.send(message).await.map_err(|e| {
            self.state = TransportState::Closed;
            match e {
                WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
                WsError::Io(io) => TransportError::Io(io),
                other => TransportError::Protocol(other.to_string()),
            }
        })
    }

    async fn close(&mut self, status: CloseStatus) -> Result<(), TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            self.state = TransportState::Closed;
            return Ok(());
        };

        self.state = TransportState::Closing;
        let frame = CloseFrame {
            code: CloseCode::from(status.code),
            reason: status.reason.into(),
        };
        let result = stream.close(Some(frame)).await;
        self.state = TransportState::Closed;

        match result {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(WsError::Io(io)) => Err(TransportError::Io(io)),
            Err(e) => Err(TransportError::Protocol(e.to_string())),
        }
    }

    fn state(&self) -> TransportState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let transport = WebSocketTransport::new();
        assert_eq!(transport.state(), TransportState::Closed);
    }

    #[tokio::test]
    async fn send_before_connect_is_rejected() {
        let mut transport = WebSocketTransport::new();
        let err = transport
            .send(b"data", FrameKind::Text, true)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NotOpen));
    }

    #[tokio::test]
    async fn connect_failure_reports_and_stays_closed() {
        let mut transport = WebSocketTransport::new();
        // Nothing listens on this port.
        let err = transport.connect("ws://127.0.0.1:1/ws").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectFailed(_)));
        assert_eq!(transport.state(), TransportState::Closed);
    }

    #[tokio::test]
    async fn close_without_connection_is_a_noop() {
        let mut transport = WebSocketTransport::new();
        transport.close(CloseStatus::normal()).await.unwrap();
        assert_eq!(transport.state(), TransportState::Closed);
    }
}
