//! Deterministic mock agent implementing the `chat_transport` contract.
//!
//! Responses are queued up front and replayed as a framed message, split into
//! fixed-size fragments, each time a prompt frame is sent.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chat_protocol::{PromptPayload, Tag};
use chat_transport::{Transport, TransportError, TransportEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Fragment length, in characters, used when a response sets none.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// One queued agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub content: String,
    pub chunk_size: usize,
}

impl MockResponse {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Fragments emitted for this reply, message tags included.
    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        let chars: Vec<char> = self.content.chars().collect();
        let mut fragments = Vec::with_capacity(chars.len() / self.chunk_size.max(1) + 3);

        fragments.push(Tag::MessageStart.as_str().to_string());
        fragments.extend(
            chars
                .chunks(self.chunk_size.max(1))
                .map(|chunk| chunk.iter().collect::<String>()),
        );
        fragments.push(Tag::MessageEnd.as_str().to_string());
        fragments
    }
}

#[derive(Debug)]
struct MockState {
    queue: VecDeque<MockResponse>,
    sent: Vec<String>,
    /// Dropped on disconnect so the receiver ends after the close event.
    events: Option<UnboundedSender<TransportEvent>>,
}

/// In-process stand-in for the agent connection of one session.
#[derive(Debug)]
pub struct MockAgent {
    session_id: String,
    state: Mutex<MockState>,
}

impl MockAgent {
    /// Creates the mock and the receiver its events are delivered on.
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> (Self, UnboundedReceiver<TransportEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let agent = Self {
            session_id: session_id.into(),
            state: Mutex::new(MockState {
                queue: VecDeque::new(),
                sent: Vec::new(),
                events: Some(events),
            }),
        };
        (agent, receiver)
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn enqueue(&self, response: MockResponse) {
        lock_unpoisoned(&self.state).queue.push_back(response);
    }

    pub fn clear_queue(&self) {
        lock_unpoisoned(&self.state).queue.clear();
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        lock_unpoisoned(&self.state).queue.len()
    }

    /// Frames sent by the client so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        lock_unpoisoned(&self.state).sent.clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock_unpoisoned(&self.state).events.is_none()
    }

    pub fn open(&self) {
        self.emit(TransportEvent::Opened {
            session_id: self.session_id.clone(),
        });
    }

    /// Emits an arbitrary fragment, bypassing the response queue.
    pub fn push(&self, text: impl Into<String>) {
        self.emit(TransportEvent::Fragment {
            session_id: self.session_id.clone(),
            text: text.into(),
        });
    }

    pub fn push_all<I, S>(&self, fragments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for fragment in fragments {
            self.push(fragment);
        }
    }

    /// Drops queued responses, reports the connection as closed and ends the
    /// event stream. Later calls are no-ops.
    pub fn disconnect(&self, reason: Option<String>) {
        let sender = {
            let mut state = lock_unpoisoned(&self.state);
            state.queue.clear();
            state.events.take()
        };

        if let Some(sender) = sender {
            let _ = sender.send(TransportEvent::Closed {
                session_id: self.session_id.clone(),
                reason,
            });
        }
    }

    fn emit(&self, event: TransportEvent) {
        let state = lock_unpoisoned(&self.state);
        let Some(sender) = &state.events else {
            tracing::debug!(session_id = %self.session_id, "mock agent is disconnected");
            return;
        };
        if sender.send(event).is_err() {
            tracing::debug!(session_id = %self.session_id, "mock agent receiver dropped");
        }
    }
}

impl Transport for MockAgent {
    fn send(&self, frame: &str) -> Result<(), TransportError> {
        let response = {
            let mut state = lock_unpoisoned(&self.state);
            if state.events.is_none() {
                return Err(TransportError::closed());
            }
            state.sent.push(frame.to_string());

            match PromptPayload::from_frame(frame) {
                Ok(_) => state.queue.pop_front(),
                Err(error) => {
                    tracing::warn!(%error, "mock agent received a non-prompt frame");
                    None
                }
            }
        };

        if let Some(response) = response {
            self.push_all(response.fragments());
        }

        Ok(())
    }

    fn close(&self) {
        self.disconnect(None);
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
