//! Session lifecycle checkpoints.

use serde::{Deserialize, Serialize};

/// Lifecycle checkpoint reached by a session.
///
/// Exactly one status is current at any instant. Transitions are monotonic
/// within a single connection attempt; a new attempt restarts the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Driver entered, nothing attempted yet.
    Starting,
    /// Engine is about to wait for input.
    Started,
    /// Teardown begun.
    Stopping,
    /// Session will accept no more input.
    Stopped,
    /// About to attempt the transport connection.
    BeforeConnect,
    /// Transport connection established.
    AfterConnectSuccess,
    /// Transport connection could not be established.
    AfterConnectFailure,
    /// About to close the connection.
    BeforeDisconnect,
    /// Connection closed.
    AfterDisconnect,
    /// About to run the credential handshake.
    BeforeLogin,
    /// Credential handshake granted.
    AfterLoginSuccess,
    /// Credential handshake denied by the peer.
    AfterLoginFailure,
    /// Credential handshake response was malformed.
    AfterLoginError,
    /// Steady-state message exchange in progress.
    Listening,
    /// Steady-state message exchange ended.
    NotListening,
}

impl SessionStatus {
    /// Whether this checkpoint is terminal for the connection attempt.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Stopped
                | Self::AfterConnectFailure
                | Self::AfterDisconnect
                | Self::AfterLoginFailure
                | Self::AfterLoginError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        for status in [
            SessionStatus::Stopped,
            SessionStatus::AfterConnectFailure,
            SessionStatus::AfterDisconnect,
            SessionStatus::AfterLoginFailure,
            SessionStatus::AfterLoginError,
        ] {
            assert!(status.is_terminal(), "{status:?} should be terminal");
        }

        for status in [
            SessionStatus::Starting,
            SessionStatus::Started,
            SessionStatus::Stopping,
            SessionStatus::BeforeConnect,
            SessionStatus::AfterConnectSuccess,
            SessionStatus::BeforeDisconnect,
            SessionStatus::BeforeLogin,
            SessionStatus::AfterLoginSuccess,
            SessionStatus::Listening,
            SessionStatus::NotListening,
        ] {
            assert!(!status.is_terminal(), "{status:?} should not be terminal");
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::AfterLoginSuccess).unwrap();
        assert_eq!(json, "\"after_login_success\"");

        let parsed: SessionStatus = serde_json::from_str("\"before_connect\"").unwrap();
        assert_eq!(parsed, SessionStatus::BeforeConnect);
    }
}
