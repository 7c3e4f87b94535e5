//! Lifecycle of the engine's single connection.

use std::fmt;

/// Where the connection is in its lifecycle.
///
/// `Idle → Connecting → Open → Authenticating → Ready → Closed`, with `Error`
/// reachable from any state short of `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Authenticating,
    Ready,
    Closed,
    Error,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Closed
    }

    /// Whether inbound frames are dispatched in this state.
    pub fn accepts_frames(self) -> bool {
        matches!(
            self,
            ConnectionState::Open | ConnectionState::Authenticating | ConnectionState::Ready
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Ready => "ready",
            ConnectionState::Closed => "closed",
            ConnectionState::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
