//! Echo client demo: connects to a WebSocket endpoint and echoes every text
//! message back.
//!
//! Run with: cargo run -p echo-client-demo -- ws://127.0.0.1:9001
//!
//! Set `LOGIN_CREDENTIALS` to exercise the credential handshake against a
//! server that answers with a `{"granted": ...}` result.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ws_session_core::{LogicalMessage, SessionConfig, SessionHooks, SessionStatus};
use ws_session_engine::SessionDriver;
use ws_session_transport::WebSocketTransport;

struct EchoHooks {
    credentials: Option<String>,
}

impl SessionHooks for EchoHooks {
    fn on_status(&mut self, status: SessionStatus) -> bool {
        tracing::info!(?status, "Checkpoint");
        true
    }

    fn on_login(&mut self) -> Option<String> {
        self.credentials.clone()
    }

    fn on_message(&mut self, message: LogicalMessage) -> Option<String> {
        match message.as_text() {
            Some(text) => {
                tracing::info!(%text, "Received");
                Some(text.to_owned())
            }
            None => {
                tracing::info!(bytes = message.len(), "Received binary message");
                None
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:9001".to_string());
    let credentials = std::env::var("LOGIN_CREDENTIALS").ok();

    let config = SessionConfig::new(url).with_login_required(credentials.is_some());
    let hooks = EchoHooks { credentials };

    let final_status = SessionDriver::new(config, WebSocketTransport::new(), hooks)
        .run()
        .await;
    tracing::info!(?final_status, "Session finished");

    Ok(())
}
