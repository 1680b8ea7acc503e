use thiserror::Error;

/// Reason a structured payload was rejected.
///
/// Public decoders swallow this after logging it; it is exposed for callers
/// that validate payloads directly.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is empty after stripping markers")]
    Empty,

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' has an unsupported value")]
    InvalidField(&'static str),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid agent host: {0:?}")]
    InvalidHost(String),

    #[error("invalid agent endpoint {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("prompt payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
