use chat_protocol::{ConfirmationAction, Context, ResourceLinkAction};
use time::OffsetDateTime;

/// Per-session message identifier, issued from 1 by [`crate::SessionStore::add_message`].
pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    /// Capitalised name used in transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl ConfirmationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub action: ConfirmationAction,
    pub status: ConfirmationStatus,
}

impl Confirmation {
    #[must_use]
    pub fn pending(action: ConfirmationAction) -> Self {
        Self {
            action,
            status: ConfirmationStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ConfirmationStatus::Pending
    }
}

/// Rendering template for messages whose visible body is not plain content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTemplate {
    /// Greeting turn opened by the agent when a session starts.
    Welcome { principal: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub message_content: String,
    pub thinking_content: Option<String>,
    pub thinking: bool,
    /// `None` only before the first fragment for this message arrives.
    pub completed: Option<bool>,
    pub summary_content: Option<String>,
    pub context_content: Vec<Context>,
    pub related_resources_actions: Option<Vec<ResourceLinkAction>>,
    pub suggestion_actions: Option<Vec<String>>,
    pub confirmation: Option<Confirmation>,
    pub template: Option<MessageTemplate>,
    pub show_thinking: bool,
    pub timestamp: OffsetDateTime,
}

impl Message {
    pub fn is_incomplete(&self) -> bool {
        self.completed == Some(false)
    }

    pub fn is_completed(&self) -> bool {
        self.completed == Some(true)
    }

    pub fn has_pending_confirmation(&self) -> bool {
        self.confirmation.as_ref().is_some_and(Confirmation::is_pending)
    }

    pub(crate) fn from_draft(id: MessageId, draft: NewMessage) -> Self {
        Self {
            id,
            role: draft.role,
            message_content: draft.message_content,
            thinking_content: draft.thinking_content,
            thinking: draft.thinking,
            completed: draft.completed,
            summary_content: draft.summary_content,
            context_content: draft.context_content,
            related_resources_actions: draft.related_resources_actions,
            suggestion_actions: draft.suggestion_actions,
            confirmation: draft.confirmation,
            template: draft.template,
            show_thinking: draft.show_thinking,
            timestamp: draft.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
        }
    }
}

/// Message draft passed to [`crate::SessionStore::add_message`]; the store
/// assigns the id and fills a missing timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub message_content: String,
    pub thinking_content: Option<String>,
    pub thinking: bool,
    pub completed: Option<bool>,
    pub summary_content: Option<String>,
    pub context_content: Vec<Context>,
    pub related_resources_actions: Option<Vec<ResourceLinkAction>>,
    pub suggestion_actions: Option<Vec<String>>,
    pub confirmation: Option<Confirmation>,
    pub template: Option<MessageTemplate>,
    pub show_thinking: bool,
    pub timestamp: Option<OffsetDateTime>,
}

impl NewMessage {
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            message_content: String::new(),
            thinking_content: None,
            thinking: false,
            completed: None,
            summary_content: None,
            context_content: Vec::new(),
            related_resources_actions: None,
            suggestion_actions: None,
            confirmation: None,
            template: None,
            show_thinking: false,
            timestamp: None,
        }
    }

    /// User turn carrying `content`. User turns never take part in
    /// completion, so `completed` stays `None`.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User).with_content(content)
    }

    /// Empty in-progress assistant turn, ready to receive fragments.
    #[must_use]
    pub fn assistant() -> Self {
        let mut draft = Self::new(Role::Assistant).with_completed(false);
        draft.thinking_content = Some(String::new());
        draft
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System).with_content(content)
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.message_content = content.into();
        self
    }

    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary_content = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_contexts(mut self, contexts: Vec<Context>) -> Self {
        self.context_content = contexts;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.template = Some(template);
        self
    }

    #[must_use]
    pub fn with_show_thinking(mut self, show_thinking: bool) -> Self {
        self.show_thinking = show_thinking;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Shallow update for one message: every `Some` field overwrites the stored
/// value, `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub id: MessageId,
    pub message_content: Option<String>,
    pub thinking_content: Option<String>,
    pub thinking: Option<bool>,
    pub completed: Option<bool>,
    pub summary_content: Option<String>,
    pub context_content: Option<Vec<Context>>,
    pub related_resources_actions: Option<Vec<ResourceLinkAction>>,
    pub suggestion_actions: Option<Vec<String>>,
    pub confirmation: Option<Confirmation>,
    pub show_thinking: Option<bool>,
}

impl MessagePatch {
    #[must_use]
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn message_content(mut self, content: impl Into<String>) -> Self {
        self.message_content = Some(content.into());
        self
    }

    #[must_use]
    pub fn thinking(mut self, thinking: bool) -> Self {
        self.thinking = Some(thinking);
        self
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    #[must_use]
    pub fn confirmation(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = Some(confirmation);
        self
    }

    #[must_use]
    pub fn show_thinking(mut self, show_thinking: bool) -> Self {
        self.show_thinking = Some(show_thinking);
        self
    }

    pub(crate) fn apply(self, message: &mut Message) {
        if let Some(content) = self.message_content {
            message.message_content = content;
        }
        if let Some(thinking_content) = self.thinking_content {
            message.thinking_content = Some(thinking_content);
        }
        if let Some(thinking) = self.thinking {
            message.thinking = thinking;
        }
        if let Some(completed) = self.completed {
            message.completed = Some(completed);
        }
        if let Some(summary) = self.summary_content {
            message.summary_content = Some(summary);
        }
        if let Some(contexts) = self.context_content {
            message.context_content = contexts;
        }
        if let Some(actions) = self.related_resources_actions {
            message.related_resources_actions = Some(actions);
        }
        if let Some(suggestions) = self.suggestion_actions {
            message.suggestion_actions = Some(suggestions);
        }
        if let Some(confirmation) = self.confirmation {
            message.confirmation = Some(confirmation);
        }
        if let Some(show_thinking) = self.show_thinking {
            message.show_thinking = show_thinking;
        }
    }
}
