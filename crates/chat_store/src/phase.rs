use crate::schema::{ConfirmationStatus, Message, Role};

/// Observable conversation phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessagePhase {
    #[default]
    Idle,
    /// A user turn was sent and no agent fragment has arrived yet.
    Processing,
    Initializing,
    Thinking,
    GeneratingResponse,
    AwaitingConfirmation,
    /// The user accepted a confirmation and the agent has not replied yet.
    Confirming,
}

impl MessagePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Initializing => "initializing",
            Self::Thinking => "thinking",
            Self::GeneratingResponse => "generating_response",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Confirming => "confirming",
        }
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle | Self::AwaitingConfirmation)
    }
}

/// Compute the phase of a session from its messages, in conversation order,
/// and the phase last stored by the send action or the assembler.
///
/// Rules are tried in order:
/// 1. last message carries a confirmed confirmation: `Confirming`
/// 2. any confirmation still pending: `AwaitingConfirmation`
/// 3. last message is a user turn: the stored phase
/// 4. any message still incomplete: the stored phase
/// 5. otherwise `Idle`
pub fn derive_phase<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    stored: MessagePhase,
) -> MessagePhase {
    let messages: Vec<&Message> = messages.into_iter().collect();
    let last = messages.last();

    if last
        .and_then(|message| message.confirmation.as_ref())
        .is_some_and(|confirmation| confirmation.status == ConfirmationStatus::Confirmed)
    {
        return MessagePhase::Confirming;
    }

    if messages
        .iter()
        .any(|message| message.has_pending_confirmation())
    {
        return MessagePhase::AwaitingConfirmation;
    }

    if last.is_some_and(|message| message.role == Role::User) {
        return stored;
    }

    if messages.iter().any(|message| message.is_incomplete()) {
        return stored;
    }

    MessagePhase::Idle
}
