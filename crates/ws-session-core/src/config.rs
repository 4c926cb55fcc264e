//! Immutable per-connection session settings.

/// Default transport read size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 5120;

/// Per-connection configuration, immutable once the session starts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Endpoint the session connects to.
    pub url: String,
    /// Whether the credential handshake runs before steady-state exchange.
    pub login_required: bool,
    buffer_size: usize,
}

impl SessionConfig {
    /// Configuration for the given endpoint with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            login_required: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the transport read size, clamped to at least 1 byte.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Require the credential handshake.
    #[must_use]
    pub fn with_login_required(mut self, login_required: bool) -> Self {
        self.login_required = login_required;
        self
    }

    /// Transport read size in bytes, always at least 1.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}
