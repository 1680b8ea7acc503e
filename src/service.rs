//! Composition root tying the session store, per-session assemblers and the
//! outgoing transport together.

use std::collections::HashMap;

use chat_protocol::{dedupe_contexts, Context, PromptPayload};
use chat_store::{
    format_transcript, transcript_file_name, ConfirmationStatus, Message, MessageId, MessagePhase,
    NewMessage, SessionError, SessionStore,
};
use chat_transport::{Transport, TransportEvent};
use time::Date;

use crate::assembler::{AssemblerOptions, StreamAssembler};
use crate::config::ChatConfig;
use crate::error::ChatServiceError;
use crate::input::clean_input;

/// Session error text recorded when the connection closes.
pub const DISCONNECTED_MESSAGE: &str = "disconnected";

/// First prompt sent on a fresh connection so the agent opens with a greeting.
pub fn initial_prompt(has_context: bool) -> String {
    let suggestions = if has_context {
        "suggestions based on the context."
    } else {
        "generic suggestions."
    };
    format!(
        "Hi!\n- Send me a message with 3 {suggestions}\n- DO NOT ask for any confirmation or additional information."
    )
}

/// Exported transcript of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug)]
pub struct ChatService {
    config: ChatConfig,
    store: SessionStore,
    assemblers: HashMap<String, StreamAssembler>,
    selected_context: Vec<Context>,
    principal: Option<String>,
}

impl ChatService {
    #[must_use]
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            store: SessionStore::new(),
            assemblers: HashMap::new(),
            selected_context: Vec::new(),
            principal: None,
        }
    }

    /// Name greeted by welcome turns of sessions initialised afterwards.
    #[must_use]
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Create the session and its assembler. Returns true when the session is new.
    pub fn init_session(&mut self, session_id: &str) -> bool {
        let created = self.store.init(session_id);
        if self.store.is_initialized(session_id) {
            let options = AssemblerOptions {
                expand_thinking: self.config.expand_thinking,
                principal: self.principal.clone(),
            };
            self.assemblers
                .entry(session_id.to_string())
                .or_insert_with(|| StreamAssembler::new(session_id, options));
        }
        created
    }

    /// Create the session and seed it with `messages`.
    pub fn init_session_with(
        &mut self,
        session_id: &str,
        messages: impl IntoIterator<Item = NewMessage>,
    ) {
        self.init_session(session_id);
        for message in messages {
            self.store.add_message(session_id, message);
        }
    }

    /// Replace the context attached to plain-text prompts.
    pub fn select_context(&mut self, contexts: Vec<Context>) {
        self.selected_context = dedupe_contexts(contexts);
    }

    pub fn selected_context(&self) -> &[Context] {
        &self.selected_context
    }

    /// Connection opened: the agent is now working on the session. A session
    /// without messages asks the agent for its greeting.
    pub fn on_open(
        &mut self,
        session_id: &str,
        transport: &dyn Transport,
    ) -> Result<(), ChatServiceError> {
        self.require_session(session_id)?;
        self.store.set_phase(session_id, MessagePhase::Processing);

        if self.store.messages(session_id).next().is_some() {
            return Ok(());
        }

        let prompt = initial_prompt(!self.selected_context.is_empty());
        let frame = PromptPayload::new(prompt, &self.selected_context).to_frame()?;
        transport.send(&frame)?;
        tracing::debug!(session_id, "requested agent greeting");
        Ok(())
    }

    pub fn on_fragment(&mut self, session_id: &str, fragment: &str) {
        match self.assemblers.get_mut(session_id) {
            Some(assembler) => assembler.on_fragment(&mut self.store, fragment),
            None => tracing::debug!(session_id, "dropping fragment for unknown session"),
        }
    }

    /// Connection closed: assembled messages are kept and the close is
    /// surfaced as a transport error.
    pub fn on_close(&mut self, session_id: &str, reason: Option<&str>) {
        let message = match reason {
            Some(reason) if !reason.trim().is_empty() => {
                format!("{DISCONNECTED_MESSAGE}: {}", reason.trim())
            }
            _ => DISCONNECTED_MESSAGE.to_string(),
        };

        tracing::info!(session_id, reason = %message, "agent connection closed");
        self.store
            .set_error(session_id, Some(SessionError::transport(message)));
        self.store.set_phase(session_id, MessagePhase::Idle);
    }

    pub fn handle_event(
        &mut self,
        event: TransportEvent,
        transport: &dyn Transport,
    ) -> Result<(), ChatServiceError> {
        match event {
            TransportEvent::Opened { session_id } => self.on_open(&session_id, transport),
            TransportEvent::Fragment { session_id, text } => {
                self.on_fragment(&session_id, &text);
                Ok(())
            }
            TransportEvent::Closed { session_id, reason } => {
                self.on_close(&session_id, reason.as_deref());
                Ok(())
            }
        }
    }

    /// Send a typed prompt with the selected context.
    ///
    /// Blank prompts are ignored and return `Ok(None)`. The user turn is
    /// recorded only after the frame was handed to the transport.
    pub fn send_message(
        &mut self,
        session_id: &str,
        text: &str,
        transport: &dyn Transport,
    ) -> Result<Option<MessageId>, ChatServiceError> {
        let prompt = clean_input(text);
        if prompt.is_empty() {
            return Ok(None);
        }

        let message = NewMessage::user(prompt).with_contexts(self.selected_context.clone());
        self.send_prepared(session_id, message, transport)
    }

    /// Send a prepared turn, e.g. one built by [`crate::template::fill`]. The
    /// turn's own context goes on the wire.
    pub fn send_prepared(
        &mut self,
        session_id: &str,
        message: NewMessage,
        transport: &dyn Transport,
    ) -> Result<Option<MessageId>, ChatServiceError> {
        if message.message_content.trim().is_empty() {
            return Ok(None);
        }
        self.require_session(session_id)?;

        let frame = PromptPayload::new(message.message_content.clone(), &message.context_content)
            .to_frame()?;
        transport.send(&frame)?;

        let id = self.store.add_message(session_id, message);
        self.store.set_phase(session_id, MessagePhase::Processing);
        Ok(id)
    }

    /// Answer the pending confirmation of message `id`.
    pub fn confirm_message(
        &mut self,
        session_id: &str,
        id: MessageId,
        accepted: bool,
        transport: &dyn Transport,
    ) -> Result<(), ChatServiceError> {
        self.require_session(session_id)?;
        let message =
            self.store
                .message(session_id, id)
                .ok_or_else(|| ChatServiceError::UnknownMessage {
                    session_id: session_id.to_string(),
                    id,
                })?;
        if !message.has_pending_confirmation() {
            return Err(ChatServiceError::NoPendingConfirmation(id));
        }

        let frame = PromptPayload::confirmation_reply(accepted).to_frame()?;
        transport.send(&frame)?;

        let status = if accepted {
            ConfirmationStatus::Confirmed
        } else {
            ConfirmationStatus::Canceled
        };
        self.store.edit_message(session_id, id, |message| {
            if let Some(confirmation) = message.confirmation.as_mut() {
                confirmation.status = status;
            }
            message.completed = Some(true);
        });
        self.store.set_phase(session_id, MessagePhase::Processing);
        tracing::debug!(session_id, id, status = status.as_str(), "confirmation answered");
        Ok(())
    }

    pub fn reset_messages(&mut self, session_id: &str) {
        self.store.reset_messages(session_id);
        if let Some(assembler) = self.assemblers.get_mut(session_id) {
            assembler.reset();
        }
    }

    pub fn reset_error(&mut self, session_id: &str) {
        self.store.set_error(session_id, None);
    }

    pub fn messages(&self, session_id: &str) -> impl Iterator<Item = &Message> + '_ {
        self.store.messages(session_id)
    }

    pub fn message(&self, session_id: &str, id: MessageId) -> Option<&Message> {
        self.store.message(session_id, id)
    }

    pub fn phase(&self, session_id: &str) -> MessagePhase {
        self.store.phase(session_id)
    }

    pub fn error(&self, session_id: &str) -> Option<&SessionError> {
        self.store.error(session_id)
    }

    /// Returns true while the agent's greeting has not completed yet.
    pub fn pending_initialization(&self, session_id: &str) -> bool {
        self.store
            .session(session_id)
            .map_or(true, |session| !session.has_completed_message())
    }

    pub fn export_transcript(
        &self,
        session_id: &str,
        date: Date,
    ) -> Result<Transcript, ChatServiceError> {
        self.require_session(session_id)?;

        Ok(Transcript {
            file_name: transcript_file_name(session_id, date),
            content: format_transcript(self.store.messages(session_id))?,
        })
    }

    fn require_session(&self, session_id: &str) -> Result<(), ChatServiceError> {
        if self.store.is_initialized(session_id) {
            Ok(())
        } else {
            Err(ChatServiceError::UnknownSession(session_id.to_string()))
        }
    }
}
