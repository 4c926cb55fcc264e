//! Handle to a session running on its own task.

use tokio::task::JoinHandle;
use uuid::Uuid;

use ws_session_core::{SessionStatus, Signal};

/// Owning handle returned by [`SessionDriver::spawn`].
///
/// Exposes the per-session lifecycle signals and the cooperative cancel
/// control; dropping the handle does not stop the session.
///
/// [`SessionDriver::spawn`]: crate::driver::SessionDriver::spawn
pub struct SessionHandle {
    id: Uuid,
    started: Signal,
    ended: Signal,
    cancel: Signal,
    task: JoinHandle<SessionStatus>,
}

impl SessionHandle {
    pub(crate) fn new(
        id: Uuid,
        started: Signal,
        ended: Signal,
        cancel: Signal,
        task: JoinHandle<SessionStatus>,
    ) -> Self {
        Self {
            id,
            started,
            ended,
            cancel,
            task,
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Raised once the engine is actively waiting for input.
    #[must_use]
    pub fn started(&self) -> &Signal {
        &self.started
    }

    /// Raised once the engine will accept no more input.
    #[must_use]
    pub fn ended(&self) -> &Signal {
        &self.ended
    }

    /// Request cooperative cancellation. Idempotent; the session exits its
    /// loop within one iteration.
    pub fn cancel(&self) {
        self.cancel.raise();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_raised()
    }

    /// Wait for the session to finish and return its final checkpoint.
    pub async fn join(self) -> SessionStatus {
        match self.task.await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(session = %self.id, "Session task failed: {e}");
                SessionStatus::Stopped
            }
        }
    }
}
