use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::ProtocolError;

/// Reply text sent when the user accepts a confirmation request.
pub const CONFIRM_REPLY: &str = "yes";
/// Reply text sent when the user cancels a confirmation request.
pub const CANCEL_REPLY: &str = "no";

/// Wire shape of every user-originated frame.
///
/// The context list collapses into a flat `{tag: value}` mapping; a later
/// context with an already-seen tag overwrites the earlier value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub prompt: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl PromptPayload {
    pub fn new(prompt: impl Into<String>, contexts: &[Context]) -> Self {
        let mut context = Map::new();
        for item in contexts {
            context.insert(item.tag.clone(), item.value.clone());
        }

        Self {
            prompt: prompt.into(),
            context,
        }
    }

    /// Payload for a confirmation reply; replies never carry context.
    pub fn confirmation_reply(accepted: bool) -> Self {
        Self::new(if accepted { CONFIRM_REPLY } else { CANCEL_REPLY }, &[])
    }

    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_frame(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }
}
