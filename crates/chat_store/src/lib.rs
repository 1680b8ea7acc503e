mod error;
mod export;
mod phase;
mod schema;
mod store;

pub use error::{ExportError, SessionError, SessionErrorKind};
pub use export::{format_transcript, transcript_file_name};
pub use phase::{derive_phase, MessagePhase};
pub use schema::{
    Confirmation, ConfirmationStatus, Message, MessageId, MessagePatch, MessageTemplate,
    NewMessage, Role,
};
pub use store::{ChatSession, SessionStore};
