use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ambient situational hint attached to a user turn and sent to the agent.
///
/// Identity is the `(tag, value)` pair; labels and icons are presentation
/// only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub tag: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Set for contexts contributed by a UI hook (a hovered table row, a
    /// details banner) rather than by global console state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_id: Option<String>,
}

impl Context {
    #[must_use]
    pub fn new(tag: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
            value_label: None,
            description: None,
            icon: None,
            hook_id: None,
        }
    }

    #[must_use]
    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_hook_id(mut self, hook_id: impl Into<String>) -> Self {
        self.hook_id = Some(hook_id.into());
        self
    }

    /// Returns true when both contexts share the same `(tag, value)` identity.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.tag == other.tag && self.value == other.value
    }

    /// Human label for the value: the explicit label, else the raw string.
    pub fn display_value(&self) -> String {
        if let Some(label) = &self.value_label {
            return label.clone();
        }

        match &self.value {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

/// Drop later duplicates by `(tag, value)`, keeping first-seen order.
pub fn dedupe_contexts(contexts: impl IntoIterator<Item = Context>) -> Vec<Context> {
    let mut unique: Vec<Context> = Vec::new();
    for context in contexts {
        if !unique.iter().any(|seen| seen.same_identity(&context)) {
            unique.push(context);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{dedupe_contexts, Context};

    #[test]
    fn dedupe_keeps_first_occurrence_per_tag_and_value() {
        let contexts = vec![
            Context::new("cluster", "local").with_value_label("Local"),
            Context::new("namespace", "default"),
            Context::new("cluster", "local").with_value_label("duplicate"),
            Context::new("cluster", "downstream"),
        ];

        let unique = dedupe_contexts(contexts);

        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].value_label.as_deref(), Some("Local"));
        assert_eq!(unique[2].value, json!("downstream"));
    }

    #[test]
    fn display_value_prefers_label_then_string_value() {
        assert_eq!(
            Context::new("cluster", "c-123")
                .with_value_label("prod")
                .display_value(),
            "prod"
        );
        assert_eq!(Context::new("namespace", "kube-system").display_value(), "kube-system");
        assert_eq!(Context::new("replicas", 3).display_value(), "3");
    }
}
