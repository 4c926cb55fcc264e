//! Login handshake wire contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured result of the credential handshake.
///
/// The outbound credential payload is an opaque application string; this is
/// the inbound side. Unknown extension fields are preserved but not
/// interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Whether the peer granted the session.
    pub granted: bool,
    /// Denial reason; empty when absent (grants usually omit it).
    #[serde(default)]
    pub reason: String,
    /// Extension fields carried through untouched.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl LoginResult {
    /// Parse a login result from the handshake response text.
    ///
    /// # Errors
    /// Returns the deserialization error for a malformed payload; the
    /// session treats that as a terminal protocol fault.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
