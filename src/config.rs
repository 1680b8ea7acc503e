//! Environment configuration.

use std::env;

use chat_protocol::{
    agent_socket_url, ProtocolError, DEFAULT_AGENT_API_PATH, DEFAULT_AGENT_NAME,
    DEFAULT_AGENT_NAMESPACE,
};
use url::Url;

/// Session id used when none is configured.
pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Show reasoning regions of new assistant turns expanded.
    pub expand_thinking: bool,
    pub agent_namespace: String,
    pub agent_name: String,
    pub agent_api_path: String,
    pub session_id: String,
    /// `tracing` filter directives; `RUST_LOG` and the built-in default apply when unset.
    pub log_filter: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            expand_thinking: false,
            agent_namespace: DEFAULT_AGENT_NAMESPACE.to_string(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            agent_api_path: DEFAULT_AGENT_API_PATH.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            log_filter: None,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            expand_thinking: env_flag("CONSOLE_CHAT_EXPAND_THINKING"),
            agent_namespace: env_string_opt("CONSOLE_CHAT_AGENT_NAMESPACE")
                .unwrap_or(defaults.agent_namespace),
            agent_name: env_string_opt("CONSOLE_CHAT_AGENT_NAME").unwrap_or(defaults.agent_name),
            agent_api_path: env_string_opt("CONSOLE_CHAT_AGENT_API_PATH")
                .unwrap_or(defaults.agent_api_path),
            session_id: env_string_opt("CONSOLE_CHAT_SESSION_ID").unwrap_or(defaults.session_id),
            log_filter: env_string_opt("CONSOLE_CHAT_LOG"),
        }
    }

    /// Agent websocket endpoint behind the console host's service proxy.
    pub fn socket_url(&self, host: &str) -> Result<Url, ProtocolError> {
        agent_socket_url(
            host,
            &self.agent_namespace,
            &self.agent_name,
            &self.agent_api_path,
        )
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
