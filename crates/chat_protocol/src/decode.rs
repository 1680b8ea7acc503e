use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::tags::Tag;

/// Presentation hint for a resource action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    Button,
    Link,
}

/// Infrastructure resource addressed by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResource {
    pub kind: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub namespace: String,
    pub cluster: String,
}

/// One "view this resource" action decoded from an `<mcp-response>` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLinkAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub label: String,
    pub resource: ActionResource,
}

impl ResourceLinkAction {
    fn for_resource(resource: ActionResource) -> Self {
        Self {
            action_type: ActionType::Button,
            label: format!("View {}: {}", resource.kind, resource.name),
            resource,
        }
    }
}

/// Mutation proposal carried by a `<confirmation-response>` payload.
///
/// Known fields are typed; anything else the agent sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationAction {
    /// Operation kind, e.g. `create`, `patch` or `delete`, kept as sent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfirmationAction {
    /// Operation kind when the agent sent it as a string.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation.as_ref()?.as_str()
    }

    /// Patch-style operations; a non-list payload yields none.
    pub fn operations(&self) -> &[Value] {
        match &self.payload {
            Some(Value::Array(operations)) => operations,
            _ => &[],
        }
    }

    /// Resource field as a string when the agent provided one.
    pub fn resource_field(&self, field: &str) -> Option<&str> {
        self.resource.as_ref()?.get(field)?.as_str()
    }
}

fn single_quoted_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"'([^']*)'").expect("quote regex must compile"))
}

/// Rewrite single-quoted runs as double-quoted so JSON-like agent output
/// parses as JSON.
pub fn normalize_quotes(raw: &str) -> String {
    single_quoted_regex()
        .replace_all(raw, "\"${1}\"")
        .into_owned()
}

fn strip_markers(raw: &str, start: Tag, end: Tag) -> String {
    raw.replace(start.as_str(), "").replace(end.as_str(), "")
}

fn parse_payload(raw: &str, start: Tag, end: Tag) -> Result<Value, DecodeError> {
    let normalized = normalize_quotes(&strip_markers(raw, start, end));
    if normalized.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(serde_json::from_str::<Value>(&normalized)?)
}

/// Decode an `<mcp-response>` payload into resource actions.
///
/// Lists are decoded element by element; an element that fails validation
/// contributes nothing and does not affect its siblings.
pub fn decode_resource_links(raw: &str) -> Vec<ResourceLinkAction> {
    match parse_payload(raw, Tag::McpResponseStart, Tag::McpResponseEnd) {
        Ok(value) => actions_from_value(&value),
        Err(DecodeError::Empty) => Vec::new(),
        Err(error) => {
            tracing::warn!(%error, "failed to parse resource links payload");
            Vec::new()
        }
    }
}

fn actions_from_value(value: &Value) -> Vec<ResourceLinkAction> {
    if let Value::Array(items) = value {
        return items.iter().flat_map(actions_from_value).collect();
    }

    match validate_action_resource(value) {
        Ok(resources) => resources
            .into_iter()
            .map(ResourceLinkAction::for_resource)
            .collect(),
        Err(error) => {
            tracing::warn!(%error, payload = %value, "rejected resource link entry");
            Vec::new()
        }
    }
}

/// Validate one resource object and expand it into one resource per name.
///
/// `kind`, `namespace`, `name`, `cluster` and `type` must all be present and
/// non-null; `name` may be a string or a list of strings.
pub fn validate_action_resource(value: &Value) -> Result<Vec<ActionResource>, DecodeError> {
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    for field in ["kind", "namespace", "name", "cluster", "type"] {
        if object.get(field).map_or(true, Value::is_null) {
            return Err(DecodeError::MissingField(field));
        }
    }

    let kind = string_field(object, "kind")?;
    let namespace = string_field(object, "namespace")?;
    let cluster = string_field(object, "cluster")?;
    let resource_type = string_field(object, "type")?;
    let names = match &object["name"] {
        Value::String(name) => vec![name.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(ToString::to_string)
                    .ok_or(DecodeError::InvalidField("name"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(DecodeError::InvalidField("name")),
    };

    Ok(names
        .into_iter()
        .map(|name| ActionResource {
            kind: kind.clone(),
            resource_type: resource_type.clone(),
            name,
            namespace: namespace.clone(),
            cluster: cluster.clone(),
        })
        .collect())
}

fn string_field(object: &Map<String, Value>, field: &'static str) -> Result<String, DecodeError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or(DecodeError::InvalidField(field))
}

/// Decode a `<confirmation-response>` payload.
///
/// Returns `None` for anything that is not a JSON object.
pub fn decode_confirmation_action(raw: &str) -> Option<ConfirmationAction> {
    let value = match parse_payload(raw, Tag::ConfirmationStart, Tag::ConfirmationEnd) {
        Ok(value) => value,
        Err(DecodeError::Empty) => return None,
        Err(error) => {
            tracing::warn!(%error, "failed to parse confirmation payload");
            return None;
        }
    };

    if !value.is_object() {
        tracing::warn!(error = %DecodeError::NotAnObject, "rejected confirmation payload");
        return None;
    }

    match serde_json::from_value::<ConfirmationAction>(value) {
        Ok(action) => Some(action),
        Err(error) => {
            tracing::warn!(%error, "confirmation payload has unexpected field types");
            None
        }
    }
}

/// Extract the plain text carried by an `<error>` payload.
pub fn decode_error_payload(raw: &str) -> String {
    strip_markers(raw, Tag::ErrorStart, Tag::ErrorEnd)
        .trim()
        .to_string()
}
