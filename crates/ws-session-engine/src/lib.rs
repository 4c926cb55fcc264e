//! Single-connection session engine.
//!
//! The driver owns one connection end-to-end: connect, optional credential
//! handshake, steady-state receive/dispatch, teardown. Lifecycle checkpoints
//! are reported through the session's hooks, which can veto continuation.

pub mod driver;
pub mod handle;

pub use driver::{PendingAction, SessionDriver};
pub use handle::SessionHandle;
