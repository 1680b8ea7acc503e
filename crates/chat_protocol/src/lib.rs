//! Wire-level primitives for the agent chat stream.
//!
//! This crate owns the literal tag vocabulary, fragment classification, and
//! the defensive decoders for structured payloads embedded in the stream. It
//! holds no session state and performs no I/O.
//!
//! Decoders never fail towards their caller: malformed payloads degrade to an
//! empty or `None` result and a `tracing` warning, so one corrupted payload
//! cannot abort an otherwise valid streaming message.

pub mod context;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod payload;
pub mod suggestion;
pub mod tags;

pub use context::{dedupe_contexts, Context};
pub use decode::{
    decode_confirmation_action, decode_error_payload, decode_resource_links, normalize_quotes,
    validate_action_resource, ActionResource, ActionType, ConfirmationAction, ResourceLinkAction,
};
pub use endpoint::{
    agent_socket_url, DEFAULT_AGENT_API_PATH, DEFAULT_AGENT_NAME, DEFAULT_AGENT_NAMESPACE,
};
pub use error::{DecodeError, ProtocolError};
pub use payload::{PromptPayload, CANCEL_REPLY, CONFIRM_REPLY};
pub use suggestion::{extract_suggestions, MAX_SUGGESTIONS_PER_PASS};
pub use tags::{classify_fragment, Fragment, Tag};
