//! Incremental assembly of agent turns from the fragment stream.
//!
//! One [`StreamAssembler`] exists per session. Each fragment is applied to
//! the session store completely before the next one is read. Until some
//! message of the session has completed, fragments build the system welcome
//! turn; afterwards every `<message>` opens a new assistant turn.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use chat_protocol::{
    classify_fragment, decode_confirmation_action, decode_error_payload, decode_resource_links,
    extract_suggestions, Fragment, Tag,
};
use chat_store::{
    Confirmation, Message, MessageId, MessagePhase, MessageTemplate, NewMessage, Role,
    SessionError, SessionStore,
};

use crate::error::AssemblerError;

/// Prefix of session errors raised by unexpected processing failures.
pub const PROCESSING_ERROR_PREFIX: &str = "Error processing messages:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Initial `show_thinking` of new assistant turns.
    pub expand_thinking: bool,
    /// User greeted by the welcome turn.
    pub principal: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StreamAssembler {
    session_id: String,
    current_message_id: Option<MessageId>,
    options: AssemblerOptions,
}

impl StreamAssembler {
    #[must_use]
    pub fn new(session_id: impl Into<String>, options: AssemblerOptions) -> Self {
        Self {
            session_id: session_id.into(),
            current_message_id: None,
            options,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Message currently receiving fragments, if any.
    #[must_use]
    pub fn current_message_id(&self) -> Option<MessageId> {
        self.current_message_id
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Forget the current message; used when the session is reset.
    pub fn reset(&mut self) {
        self.current_message_id = None;
    }

    /// Apply one fragment to the session.
    ///
    /// Errors and panics raised while applying the fragment are stored as the
    /// session error and the stored phase returns to `Idle`. Later fragments
    /// are processed normally.
    pub fn on_fragment(&mut self, store: &mut SessionStore, fragment: &str) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.apply(store, fragment)));
        self.record_outcome(store, outcome);
    }

    /// Turn the outcome of one fragment into the session error, if any.
    fn record_outcome(
        &self,
        store: &mut SessionStore,
        outcome: thread::Result<Result<(), AssemblerError>>,
    ) {
        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(AssemblerError::UnknownSession(session_id))) => {
                tracing::debug!(%session_id, "dropping fragment for uninitialised session");
                return;
            }
            Ok(Err(AssemblerError::Agent(message))) => SessionError::protocol(message),
            Err(payload) => SessionError::processing(format!(
                "{PROCESSING_ERROR_PREFIX} {}",
                panic_message(payload.as_ref())
            )),
        };

        tracing::error!(
            session_id = %self.session_id,
            kind = error.kind.as_str(),
            message = %error.message,
            "failed to process fragment"
        );
        store.set_error(&self.session_id, Some(error));
        store.set_phase(&self.session_id, MessagePhase::Idle);
    }

    fn apply(&mut self, store: &mut SessionStore, fragment: &str) -> Result<(), AssemblerError> {
        let session = store
            .session(&self.session_id)
            .ok_or_else(|| AssemblerError::UnknownSession(self.session_id.clone()))?;

        if session.has_completed_message() {
            self.apply_message_fragment(store, fragment)
        } else {
            self.apply_welcome_fragment(store, fragment)
        }
    }

    fn apply_welcome_fragment(
        &mut self,
        store: &mut SessionStore,
        fragment: &str,
    ) -> Result<(), AssemblerError> {
        store.set_phase(&self.session_id, MessagePhase::Initializing);

        match classify_fragment(fragment) {
            Fragment::Control(Tag::MessageStart) => {
                self.finish_incomplete(store);
                let welcome = NewMessage::new(Role::System)
                    .with_template(MessageTemplate::Welcome {
                        principal: self.options.principal.clone(),
                    })
                    .with_completed(false);
                self.current_message_id = store.add_message(&self.session_id, welcome);
            }
            Fragment::Control(Tag::MessageEnd) => {
                store.set_phase(&self.session_id, MessagePhase::Idle);
                self.finish_current(store);
            }
            Fragment::Control(Tag::ThinkingStart) => self.set_thinking(store, true),
            Fragment::Control(Tag::ThinkingEnd) => self.set_thinking(store, false),
            Fragment::Error(raw) => {
                if self.current_incomplete(store).is_some() {
                    return Err(AssemblerError::Agent(decode_error_payload(raw)));
                }
            }
            _ => {
                let Some(current) = self.current_incomplete(store) else {
                    tracing::debug!(session_id = %self.session_id, "dropping welcome fragment without an open message");
                    return Ok(());
                };
                if current.thinking {
                    self.append_reasoning(store, fragment);
                } else {
                    self.append_body(store, fragment);
                }
            }
        }

        Ok(())
    }

    fn apply_message_fragment(
        &mut self,
        store: &mut SessionStore,
        fragment: &str,
    ) -> Result<(), AssemblerError> {
        match classify_fragment(fragment) {
            Fragment::Control(Tag::MessageStart) => {
                store.set_phase(&self.session_id, MessagePhase::GeneratingResponse);
                self.finish_incomplete(store);
                let draft = NewMessage::assistant().with_show_thinking(self.options.expand_thinking);
                self.current_message_id = store.add_message(&self.session_id, draft);
            }
            Fragment::Control(Tag::ThinkingStart) => {
                store.set_phase(&self.session_id, MessagePhase::Thinking);
                self.set_thinking(store, true);
            }
            Fragment::Control(Tag::ThinkingEnd) => {
                store.set_phase(&self.session_id, MessagePhase::GeneratingResponse);
                self.set_thinking(store, false);
            }
            Fragment::Control(Tag::MessageEnd) => {
                store.set_phase(&self.session_id, MessagePhase::Idle);
                self.finish_current(store);
            }
            _ => return self.apply_content(store, fragment),
        }

        Ok(())
    }

    fn apply_content(
        &mut self,
        store: &mut SessionStore,
        fragment: &str,
    ) -> Result<(), AssemblerError> {
        let Some(current) = self.current_incomplete(store) else {
            tracing::debug!(session_id = %self.session_id, "dropping fragment without an open message");
            return Ok(());
        };

        if current.thinking {
            self.append_reasoning(store, fragment);
            return Ok(());
        }

        let body_empty = current.message_content.is_empty();
        store.set_phase(&self.session_id, MessagePhase::GeneratingResponse);

        if body_empty && fragment.trim().is_empty() {
            return Ok(());
        }

        match classify_fragment(fragment) {
            Fragment::ResourceLinks(raw) => {
                let actions = decode_resource_links(raw);
                self.edit_current(store, |message| {
                    message.related_resources_actions = Some(actions);
                });
                return Ok(());
            }
            Fragment::Confirmation(raw) => {
                if let Some(action) = decode_confirmation_action(raw) {
                    self.edit_current(store, |message| {
                        message.confirmation = Some(Confirmation::pending(action));
                        message.thinking = false;
                        message.completed = Some(true);
                    });
                    return Ok(());
                }
            }
            Fragment::Error(raw) => return Err(AssemblerError::Agent(decode_error_payload(raw))),
            Fragment::Control(_) | Fragment::Text(_) => {}
        }

        self.append_body(store, fragment);
        Ok(())
    }

    fn append_reasoning(&self, store: &mut SessionStore, fragment: &str) {
        self.edit_current(store, |message| {
            let thinking = message.thinking_content.get_or_insert_with(String::new);
            if thinking.is_empty() && fragment.trim().is_empty() {
                return;
            }
            thinking.push_str(fragment);
        });
    }

    fn append_body(&self, store: &mut SessionStore, fragment: &str) {
        self.edit_current(store, |message| {
            message.message_content.push_str(fragment);

            let content = &message.message_content;
            if content.contains(Tag::SuggestionStart.as_str())
                && content.contains(Tag::SuggestionEnd.as_str())
            {
                let existing = message.suggestion_actions.take().unwrap_or_default();
                let (suggestions, remaining) = extract_suggestions(existing, content);
                message.suggestion_actions = Some(suggestions);
                message.message_content = remaining;
            }
        });
    }

    fn set_thinking(&self, store: &mut SessionStore, thinking: bool) {
        if self.current_incomplete(store).is_none() {
            tracing::debug!(session_id = %self.session_id, thinking, "no open message for reasoning tag");
            return;
        }
        self.edit_current(store, |message| message.thinking = thinking);
    }

    /// Close the current message: trailing line breaks are stripped and the
    /// message is marked completed.
    fn finish_current(&self, store: &mut SessionStore) {
        let finished = self.edit_current(store, |message| {
            let trimmed_len = message.message_content.trim_end_matches(['\r', '\n']).len();
            message.message_content.truncate(trimmed_len);
            message.thinking = false;
            message.completed = Some(true);
        });

        if !finished {
            tracing::debug!(session_id = %self.session_id, "message end without an open message");
        }
    }

    /// Finish a message left open by a missing `</message>`.
    fn finish_incomplete(&self, store: &mut SessionStore) {
        if let Some(current) = self.current_incomplete(store) {
            tracing::warn!(
                session_id = %self.session_id,
                message_id = current.id,
                "message started before the previous one ended"
            );
            self.finish_current(store);
        }
    }

    fn current_incomplete<'a>(&self, store: &'a SessionStore) -> Option<&'a Message> {
        store
            .message(&self.session_id, self.current_message_id?)
            .filter(|message| message.is_incomplete())
    }

    fn edit_current(&self, store: &mut SessionStore, edit: impl FnOnce(&mut Message)) -> bool {
        match self.current_message_id {
            Some(id) => store.edit_message(&self.session_id, id, edit),
            None => false,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::catch_unwind;

    use chat_store::{MessagePhase, SessionErrorKind, SessionStore};

    use super::{panic_message, StreamAssembler, PROCESSING_ERROR_PREFIX};
    use crate::error::AssemblerError;

    #[test]
    fn panic_payloads_render_as_text() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        assert_eq!(panic_message(&7_u8), "unknown panic");
    }

    #[test]
    fn new_assembler_has_no_current_message() {
        let assembler = StreamAssembler::new("chat-1", Default::default());
        assert_eq!(assembler.current_message_id(), None);
        assert_eq!(assembler.session_id(), "chat-1");
    }

    #[test]
    fn panics_become_processing_errors_and_stream_continues() {
        let mut store = SessionStore::new();
        store.init("chat-1");
        let mut assembler = StreamAssembler::new("chat-1", Default::default());
        assembler.on_fragment(&mut store, "<message>");
        store.set_phase("chat-1", MessagePhase::GeneratingResponse);

        let outcome = catch_unwind(|| -> Result<(), AssemblerError> {
            panic!("fragment handler exploded")
        });
        assembler.record_outcome(&mut store, outcome);

        let error = store.error("chat-1").expect("error stored");
        assert_eq!(error.kind, SessionErrorKind::Processing);
        assert_eq!(
            error.message,
            format!("{PROCESSING_ERROR_PREFIX} fragment handler exploded")
        );
        assert_eq!(
            store.session("chat-1").map(|session| session.stored_phase()),
            Some(MessagePhase::Idle)
        );

        assembler.on_fragment(&mut store, "Welcome!");
        assembler.on_fragment(&mut store, "</message>");

        let welcome = store.messages("chat-1").last().expect("welcome turn exists");
        assert_eq!(welcome.message_content, "Welcome!");
        assert_eq!(welcome.completed, Some(true));
    }
}
