//! Server-issued handles correlating requests to sessions and operations.
//!
//! The core never interprets these beyond rendering them in diagnostics and
//! reusing them in follow-up requests.

use std::fmt;
use std::str::FromStr;

use crate::retry::Request;

/// 16-byte server identifier, rendered as a lowercase hyphenated hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u8; 16]);

/// Error returned when a string is not 32 hex digits (hyphens allowed).
#[derive(Debug, thiserror::Error)]
pub enum GuidParseError {
    #[error("guid must have 32 hex digits, got {0}")]
    Length(usize),
    #[error("guid is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl Guid {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Random guid, for tests and simulated executions.
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = hex::encode(self.0);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &h[0..8],
            &h[8..12],
            &h[12..16],
            &h[16..20],
            &h[20..32]
        )
    }
}

impl FromStr for Guid {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 {
            return Err(GuidParseError::Length(digits.len()));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Handle of an open server session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub session_id: Guid,
}

/// Handle of one statement execution on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub operation_id: Guid,
}

/// Opaque token returned with an execution, reused for fetch/cancel calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHandle {
    pub operation: OperationHandle,
    /// Whether the server holds a result set for this command.
    pub has_result_set: bool,
}

impl CommandHandle {
    pub fn new(operation_id: Guid, has_result_set: bool) -> Self {
        Self {
            operation: OperationHandle { operation_id },
            has_result_set,
        }
    }

    /// Request variant for subsequent calls against this command, so their
    /// failures are logged with the same query id.
    pub fn follow_up_request(&self) -> Request {
        Request::OperationScoped(self.operation.clone())
    }
}
