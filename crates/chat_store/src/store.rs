use std::collections::{BTreeMap, HashMap};

use crate::error::SessionError;
use crate::phase::{derive_phase, MessagePhase};
use crate::schema::{Message, MessageId, MessagePatch, NewMessage};

/// One named conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    msg_id_cnt: MessageId,
    messages: BTreeMap<MessageId, Message>,
    phase: MessagePhase,
    error: Option<SessionError>,
}

impl ChatSession {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            msg_id_cnt: 0,
            messages: BTreeMap::new(),
            phase: MessagePhase::Idle,
            error: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Messages in conversation order.
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.values()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Phase as last stored, before derivation.
    pub fn stored_phase(&self) -> MessagePhase {
        self.phase
    }

    pub fn phase(&self) -> MessagePhase {
        derive_phase(self.messages.values(), self.phase)
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Returns true once any message in the session has completed.
    pub fn has_completed_message(&self) -> bool {
        self.messages.values().any(Message::is_completed)
    }

    fn push(&mut self, draft: NewMessage) -> MessageId {
        self.msg_id_cnt += 1;
        let id = self.msg_id_cnt;
        self.messages.insert(id, Message::from_draft(id, draft));
        id
    }
}

/// In-memory container of chat sessions keyed by session id.
///
/// Every operation on a session id that was never initialised is a no-op.
#[derive(Debug, Default)]
pub struct SessionStore {
    chats: HashMap<String, ChatSession>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session if it does not exist yet. Returns true when a new
    /// session was created.
    pub fn init(&mut self, session_id: &str) -> bool {
        if session_id.is_empty() || self.chats.contains_key(session_id) {
            return false;
        }

        self.chats
            .insert(session_id.to_string(), ChatSession::new(session_id));
        tracing::debug!(session_id, "chat session initialised");
        true
    }

    /// Initialise the session and append `messages` in order.
    pub fn init_with(&mut self, session_id: &str, messages: impl IntoIterator<Item = NewMessage>) {
        self.init(session_id);
        for message in messages {
            self.add_message(session_id, message);
        }
    }

    pub fn is_initialized(&self, session_id: &str) -> bool {
        self.chats.contains_key(session_id)
    }

    pub fn session(&self, session_id: &str) -> Option<&ChatSession> {
        self.chats.get(session_id)
    }

    pub fn session_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.chats.keys().map(String::as_str)
    }

    /// Append a message and return its newly issued id.
    pub fn add_message(&mut self, session_id: &str, message: NewMessage) -> Option<MessageId> {
        let Some(chat) = self.chats.get_mut(session_id) else {
            tracing::debug!(session_id, "add_message ignored for unknown session");
            return None;
        };

        Some(chat.push(message))
    }

    /// Merge `patch` into the message with the same id. Returns false when
    /// the session or the message does not exist.
    pub fn update_message(&mut self, session_id: &str, patch: MessagePatch) -> bool {
        let id = patch.id;
        self.edit_message(session_id, id, |message| patch.apply(message))
    }

    /// Mutate one message in place.
    pub fn edit_message(
        &mut self,
        session_id: &str,
        id: MessageId,
        edit: impl FnOnce(&mut Message),
    ) -> bool {
        match self
            .chats
            .get_mut(session_id)
            .and_then(|chat| chat.messages.get_mut(&id))
        {
            Some(message) => {
                edit(message);
                true
            }
            None => false,
        }
    }

    /// Drop every message and restart id issuance at 1.
    pub fn reset_messages(&mut self, session_id: &str) {
        if let Some(chat) = self.chats.get_mut(session_id) {
            chat.messages.clear();
            chat.msg_id_cnt = 0;
        }
    }

    pub fn set_phase(&mut self, session_id: &str, phase: MessagePhase) {
        if let Some(chat) = self.chats.get_mut(session_id) {
            chat.phase = phase;
        }
    }

    pub fn set_error(&mut self, session_id: &str, error: Option<SessionError>) {
        if let Some(chat) = self.chats.get_mut(session_id) {
            chat.error = error;
        }
    }

    /// Messages of the session in conversation order; empty for unknown ids.
    pub fn messages(&self, session_id: &str) -> impl Iterator<Item = &Message> + '_ {
        self.chats
            .get(session_id)
            .into_iter()
            .flat_map(|chat| chat.messages.values())
    }

    pub fn message(&self, session_id: &str, id: MessageId) -> Option<&Message> {
        self.chats.get(session_id)?.message(id)
    }

    /// Derived phase; `Idle` for unknown sessions.
    pub fn phase(&self, session_id: &str) -> MessagePhase {
        self.chats
            .get(session_id)
            .map_or(MessagePhase::Idle, ChatSession::phase)
    }

    pub fn error(&self, session_id: &str) -> Option<&SessionError> {
        self.chats.get(session_id)?.error()
    }
}
