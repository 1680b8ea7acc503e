use chat_protocol::ProtocolError;
use chat_store::{ExportError, MessageId};
use chat_transport::TransportError;
use thiserror::Error;

/// Failure while applying one fragment to a session.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// Error text reported by the agent in an `<error>` payload.
    #[error("{0}")]
    Agent(String),

    #[error("session '{0}' is not initialised")]
    UnknownSession(String),
}

#[derive(Debug, Error)]
pub enum ChatServiceError {
    #[error("session '{0}' is not initialised")]
    UnknownSession(String),

    #[error("message {id} does not exist in session '{session_id}'")]
    UnknownMessage { session_id: String, id: MessageId },

    #[error("message {0} has no pending confirmation")]
    NoPendingConfirmation(MessageId),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("failed to send frame to the agent: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
