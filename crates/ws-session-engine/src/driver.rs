//! The control loop that owns a single connection end-to-end.

use uuid::Uuid;

use ws_session_core::{
    CloseStatus, LogicalMessage, LoginResult, MessageAccumulator, SessionConfig, SessionHooks,
    SessionStatus, Signal, Transport, TransportState,
};
use ws_session_transport::primitives;

use crate::handle::SessionHandle;

/// The next operation the driver intends to perform.
///
/// Exactly one action is active at a time; the outcome of each action
/// determines the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Establish the transport connection.
    EstablishConnection,
    /// Send the outbound credential payload.
    SendCredentials,
    /// Wait for the structured login result.
    AwaitCredentialResponse,
    /// Wait for the next application message.
    AwaitMessage,
    /// Send a reply produced by the dispatch hook.
    SendReply(String),
}

/// Outcome of one protocol step.
///
/// A vetoed or failed step reports `Teardown` and the loop unwinds
/// explicitly; nothing is thrown across the session boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Teardown,
}

/// Single-connection session driver.
///
/// Owns one transport handle, one cancellation signal, one accumulator, and
/// one pending action. Runs on one task; the hooks are invoked inline so
/// their return values gate the very next protocol step. No error escapes
/// past [`SessionDriver::run`].
pub struct SessionDriver<T, H> {
    id: Uuid,
    config: SessionConfig,
    transport: T,
    hooks: H,
    accumulator: MessageAccumulator,
    pending: PendingAction,
    status: SessionStatus,
    started: Signal,
    ended: Signal,
    cancel: Signal,
    reached_listening: bool,
}

impl<T, H> SessionDriver<T, H>
where
    T: Transport,
    H: SessionHooks,
{
    /// Create a driver for one connection attempt.
    #[must_use]
    pub fn new(config: SessionConfig, transport: T, hooks: H) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            transport,
            hooks,
            accumulator: MessageAccumulator::new(),
            pending: PendingAction::EstablishConnection,
            status: SessionStatus::Starting,
            started: Signal::new(),
            ended: Signal::new(),
            cancel: Signal::new(),
            reached_listening: false,
        }
    }

    /// Session identifier used in log events.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Signal raised once the engine is actively waiting for input.
    #[must_use]
    pub fn started(&self) -> &Signal {
        &self.started
    }

    /// Signal raised once the engine will accept no more input.
    #[must_use]
    pub fn ended(&self) -> &Signal {
        &self.ended
    }

    /// The session's cooperative cancellation signal.
    #[must_use]
    pub fn cancel(&self) -> &Signal {
        &self.cancel
    }

    /// Run the driver on its own task, returning a handle that exposes the
    /// lifecycle signals and a cancel control.
    pub fn spawn(config: SessionConfig, transport: T, hooks: H) -> SessionHandle
    where
        T: 'static,
        H: 'static,
    {
        let driver = Self::new(config, transport, hooks);
        let (id, started, ended, cancel) = (
            driver.id,
            driver.started.clone(),
            driver.ended.clone(),
            driver.cancel.clone(),
        );
        let task = tokio::spawn(driver.run());
        SessionHandle::new(id, started, ended, cancel, task)
    }

    /// Drive the connection from connect to teardown.
    ///
    /// Returns the final lifecycle checkpoint. The ended signal is raised on
    /// every exit path.
    pub async fn run(mut self) -> SessionStatus {
        let final_status = self.drive().await;
        self.ended.raise();
        tracing::debug!(session = %self.id, ?final_status, "Session ended");
        final_status
    }

    async fn drive(&mut self) -> SessionStatus {
        if self.advance(SessionStatus::Starting) == Flow::Teardown {
            return self.status;
        }
        if self.advance(SessionStatus::BeforeConnect) == Flow::Teardown {
            // Vetoed before any transport attempt; nothing to tear down.
            return self.status;
        }

        if let Err(e) = self.transport.connect(&self.config.url).await {
            tracing::warn!(session = %self.id, url = %self.config.url, "Connect failed: {e}");
            // Terminal; retry policy belongs to the caller.
            self.notify(SessionStatus::AfterConnectFailure);
            return self.status;
        }

        if self.advance(SessionStatus::AfterConnectSuccess) == Flow::Teardown {
            return self.teardown().await;
        }

        self.pending = if self.config.login_required {
            PendingAction::SendCredentials
        } else {
            PendingAction::AwaitMessage
        };

        self.started.raise();
        if self.advance(SessionStatus::Started) == Flow::Teardown {
            return self.teardown().await;
        }
        if self.pending == PendingAction::AwaitMessage {
            if self.advance(SessionStatus::Listening) == Flow::Teardown {
                return self.teardown().await;
            }
            self.reached_listening = true;
        }

        self.receive_loop().await;
        self.teardown().await
    }

    /// Steady-state loop: one blocking point per iteration, bounded by the
    /// configured buffer size and unblocked by cancellation.
    async fn receive_loop(&mut self) {
        while self.transport.state() == TransportState::Open && !self.cancel.is_raised() {
            let action = std::mem::replace(&mut self.pending, PendingAction::AwaitMessage);
            match action {
                PendingAction::EstablishConnection => {
                    // `drive` replaces this action before entering the loop.
                    debug_assert!(false, "receive loop entered before connecting");
                    return;
                }
                PendingAction::SendCredentials => {
                    if self.send_credentials().await == Flow::Teardown {
                        return;
                    }
                }
                PendingAction::SendReply(reply) => {
                    if primitives::send_text(&mut self.transport, &reply, &self.cancel).await {
                        self.pending = PendingAction::AwaitMessage;
                    } else {
                        self.cancel.raise();
                        return;
                    }
                }
                PendingAction::AwaitCredentialResponse | PendingAction::AwaitMessage => {
                    self.pending = action;
                    if self.receive_step().await == Flow::Teardown {
                        return;
                    }
                }
            }
        }
    }

    async fn send_credentials(&mut self) -> Flow {
        if self.advance(SessionStatus::BeforeLogin) == Flow::Teardown {
            return Flow::Teardown;
        }
        let Some(credentials) = self.hooks.on_login() else {
            tracing::debug!(session = %self.id, "Login declined by application");
            return Flow::Teardown;
        };
        if primitives::send_text(&mut self.transport, &credentials, &self.cancel).await {
            self.accumulator.reset();
            self.pending = PendingAction::AwaitCredentialResponse;
            Flow::Continue
        } else {
            self.cancel.raise();
            Flow::Teardown
        }
    }

    /// One receive call, fed through the accumulator; acts only once a frame
    /// is both populated and final.
    async fn receive_step(&mut self) -> Flow {
        let cancel = self.cancel.clone();
        let max_len = self.config.buffer_size();
        let frame = tokio::select! {
            () = cancel.wait() => return Flow::Teardown,
            outcome = self.transport.receive(max_len) => match outcome {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(session = %self.id, "Receive failed: {e}");
                    return Flow::Teardown;
                }
            },
        };

        if primitives::is_closing(&frame, &self.cancel) {
            return Flow::Teardown;
        }

        let populated = match self.accumulator.populate(frame.kind, &frame.payload) {
            Ok(populated) => populated,
            Err(e) => {
                tracing::warn!(session = %self.id, "Protocol fault while accumulating: {e}");
                return Flow::Teardown;
            }
        };
        if !(populated && frame.is_final) {
            // Partial frame; keep listening without a state change.
            return Flow::Continue;
        }

        let Some(message) = self.accumulator.take() else {
            return Flow::Continue;
        };

        if self.pending == PendingAction::AwaitCredentialResponse {
            self.handle_login_response(&message)
        } else {
            self.dispatch(message);
            Flow::Continue
        }
    }

    fn handle_login_response(&mut self, message: &LogicalMessage) -> Flow {
        let Some(text) = message.as_text() else {
            tracing::warn!(session = %self.id, "Binary payload where a login result was expected");
            self.notify(SessionStatus::AfterLoginError);
            return Flow::Teardown;
        };

        match LoginResult::parse(text) {
            Ok(result) if result.granted => {
                if self.advance(SessionStatus::AfterLoginSuccess) == Flow::Teardown {
                    return Flow::Teardown;
                }
                self.accumulator.reset();
                self.pending = PendingAction::AwaitMessage;
                if self.advance(SessionStatus::Listening) == Flow::Teardown {
                    return Flow::Teardown;
                }
                self.reached_listening = true;
                Flow::Continue
            }
            Ok(result) => {
                tracing::info!(session = %self.id, reason = %result.reason, "Login denied");
                self.notify(SessionStatus::AfterLoginFailure);
                Flow::Teardown
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "Malformed login response: {e}");
                // Terminal no matter what the status callback answers.
                self.notify(SessionStatus::AfterLoginError);
                Flow::Teardown
            }
        }
    }

    /// Hand a completed message to the application; a returned reply becomes
    /// the next pending action.
    fn dispatch(&mut self, message: LogicalMessage) {
        if message.is_empty() {
            tracing::debug!(session = %self.id, "Skipping empty message");
            return;
        }
        if let Some(reply) = self.hooks.on_message(message) {
            self.pending = PendingAction::SendReply(reply);
        }
    }

    /// Unconditional close sequence. Veto results are ignored at every
    /// checkpoint in here.
    async fn teardown(&mut self) -> SessionStatus {
        if self.reached_listening {
            self.notify(SessionStatus::NotListening);
        }
        self.notify(SessionStatus::Stopping);
        self.notify(SessionStatus::BeforeDisconnect);

        if let Err(e) = self.transport.close(CloseStatus::normal()).await {
            tracing::debug!(session = %self.id, "Close failed: {e}");
        }
        // Unblocks any receive still pending elsewhere and marks the
        // session unrecoverable.
        self.cancel.raise();

        self.notify(SessionStatus::AfterDisconnect);
        self.notify(SessionStatus::Stopped);
        self.status
    }

    /// Record a checkpoint and ask the application whether to continue.
    fn advance(&mut self, status: SessionStatus) -> Flow {
        self.status = status;
        tracing::debug!(session = %self.id, ?status, "Checkpoint");
        if self.hooks.on_status(status) {
            Flow::Continue
        } else {
            tracing::debug!(session = %self.id, ?status, "Vetoed by application");
            Flow::Teardown
        }
    }

    /// Record a checkpoint whose veto result is ignored.
    fn notify(&mut self, status: SessionStatus) {
        let _ = self.advance(status);
    }
}
