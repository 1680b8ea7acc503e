//! Client core for chatting with an infrastructure console's AI agent.
//!
//! The agent streams each reply as text fragments over a duplex connection.
//! Tags embedded in the stream delimit messages, reasoning regions and
//! structured payloads. This crate turns that stream into a structured
//! conversation.
//!
//! # Overview
//! - [`ChatService`] owns the session store and routes transport events.
//! - [`StreamAssembler`] applies fragments to one session.
//! - [`ContextRegistry`] collects the context attached to prompts.
//! - [`pump`] feeds transport events into the service in arrival order.
//!
//! Wire primitives live in `chat_protocol`, the session model in
//! `chat_store` and the transport contract in `chat_transport`.

pub mod agent;
pub mod assembler;
pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod logging;
pub mod pump;
pub mod service;
pub mod template;

pub use crate::agent::{AgentProfile, AgentProvider};
pub use crate::assembler::{AssemblerOptions, StreamAssembler, PROCESSING_ERROR_PREFIX};
pub use crate::config::ChatConfig;
pub use crate::context::{ActiveCluster, ContextRegistry};
pub use crate::error::{AssemblerError, ChatServiceError, LoggingError};
pub use crate::input::clean_input;
pub use crate::service::{initial_prompt, ChatService, Transcript};

pub use chat_protocol::{Context, PromptPayload};
pub use chat_store::{
    Confirmation, ConfirmationStatus, Message, MessageId, MessagePhase, MessageTemplate,
    NewMessage, Role, SessionError, SessionErrorKind,
};
pub use chat_transport::{Transport, TransportError, TransportEvent};
