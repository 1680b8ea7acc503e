use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionErrorKind {
    /// Explicit `<error>` payload sent by the agent.
    Protocol,
    /// Failure while applying a fragment.
    Processing,
    /// Connection failure or close.
    Transport,
}

impl SessionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Processing => "processing",
            Self::Transport => "transport",
        }
    }
}

/// Session-level error shown to the user until it is reset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionError {
    #[must_use]
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Protocol, message)
    }

    #[must_use]
    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Processing, message)
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Transport, message)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to format message timestamp as RFC3339: {0}")]
    ClockFormat(#[from] time::error::Format),
}
