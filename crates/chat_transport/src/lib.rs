//! Duplex text-channel contract consumed by the chat service.
//!
//! This crate defines only the frame-sending seam and the events a
//! connection reports back. Establishing connections, retries and
//! authentication belong to the implementations.

use std::fmt;

/// Error returned when a frame could not be handed to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Creates a new transport error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error for a send attempted after the connection closed.
    #[must_use]
    pub fn closed() -> Self {
        Self::new("connection is closed")
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<String> for TransportError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TransportError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Event reported by a connection, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened {
        session_id: String,
    },
    /// One received text frame.
    Fragment {
        session_id: String,
        text: String,
    },
    Closed {
        session_id: String,
        reason: Option<String>,
    },
}

impl TransportEvent {
    /// Returns the session the event belongs to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::Opened { session_id }
            | Self::Fragment { session_id, .. }
            | Self::Closed { session_id, .. } => session_id,
        }
    }

    /// Returns true when no further events follow on this connection.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}

/// Sending half of an open duplex text connection.
pub trait Transport: Send + Sync {
    /// Sends one text frame.
    fn send(&self, frame: &str) -> Result<(), TransportError>;

    /// Closes the connection. Implementations report the close through a
    /// `TransportEvent::Closed`.
    fn close(&self) {}
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, frame: &str) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn close(&self) {
        (**self).close();
    }
}
