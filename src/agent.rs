//! Agent profile decoded from the agent configuration secret.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Model reported when the secret carries no readable model.
pub const UNKNOWN_MODEL: &str = "unknown";

/// LLM backend the agent is configured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentProvider {
    Ollama,
    Gemini,
    OpenAi,
    Bedrock,
}

impl AgentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Bedrock => "bedrock",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
            Self::Bedrock => "Amazon Bedrock",
        }
    }

    /// First provider whose credential key is present and non-empty.
    fn detect(data: &BTreeMap<String, String>) -> Option<Self> {
        let present = |key: &str| data.get(key).is_some_and(|value| !value.trim().is_empty());

        if present("OLLAMA_URL") {
            Some(Self::Ollama)
        } else if present("GOOGLE_API_KEY") {
            Some(Self::Gemini)
        } else if present("OPENAI_API_KEY") {
            Some(Self::OpenAi)
        } else if present("AWS_SECRET_ACCESS_KEY") || present("AWS_BEARER_TOKEN_BEDROCK") {
            Some(Self::Bedrock)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub provider: AgentProvider,
    pub model: String,
}

impl AgentProfile {
    /// Decode the `data` map of the agent secret (values base64 encoded).
    ///
    /// Returns `None` when no provider credential is configured.
    pub fn from_secret_data(data: &BTreeMap<String, String>) -> Option<Self> {
        let provider = AgentProvider::detect(data)?;
        let model = data
            .get("MODEL")
            .and_then(|encoded| decode_model(encoded))
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

        Some(Self { provider, model })
    }
}

fn decode_model(encoded: &str) -> Option<String> {
    let bytes = match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "agent model is not valid base64");
            return None;
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    match serde_yaml::from_str::<serde_yaml::Value>(&text) {
        Ok(serde_yaml::Value::String(model)) if !model.trim().is_empty() => Some(model),
        Ok(serde_yaml::Value::Number(number)) => Some(number.to_string()),
        Ok(serde_yaml::Value::Bool(flag)) => Some(flag.to_string()),
        Ok(serde_yaml::Value::Null) | Ok(serde_yaml::Value::String(_)) => None,
        Ok(other) => {
            tracing::warn!(?other, "agent model is not a scalar");
            None
        }
        Err(error) => {
            tracing::warn!(%error, "error parsing agent model version");
            None
        }
    }
}
