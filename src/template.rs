//! User turns prefilled from a resource the user asked the agent about.

use chat_protocol::{dedupe_contexts, Context};
use chat_store::NewMessage;
use serde_json::Value;

use crate::context::NAMESPACE_TAG;

/// Hook on a row of a resource list.
pub const SORTABLE_TABLE_ROW_TAG: &str = "__sortable-table-row";
/// Hook on the state badge of a resource detail page.
pub const DETAILS_STATE_TAG: &str = "__details-state";
/// Hook on the status banner of a resource detail page.
pub const STATUS_BANNER_TAG: &str = "__details-state-banner";

const DEFAULT_PROMPT: &str = "Hey Liz, please analyse the resource";
const HEALTHY_STATES: [&str; 3] = ["active", "running", "ready"];

/// Build the user turn for a hooked resource context.
///
/// `hook_context.value` is the resource object (`kind`, `name`, `namespace`,
/// `state`, and `bannerProps` for banners). The turn carries the global
/// context plus the resource and its namespace.
pub fn fill(hook_context: &Context, global_context: &[Context]) -> NewMessage {
    let resource = &hook_context.value;
    let kind = string_at(resource, "kind");
    let name = string_at(resource, "name");

    let (prompt, summary) = match hook_context.tag.as_str() {
        SORTABLE_TABLE_ROW_TAG | DETAILS_STATE_TAG => (
            analysis_prompt(resource),
            Some(format!(
                "Hey Liz, please analyse {kind}: **{name}** and troubleshoot any problems."
            )),
        ),
        STATUS_BANNER_TAG => {
            let banner = resource.get("bannerProps");
            let label = banner.map(|props| string_at(props, "label")).unwrap_or_default();
            let target = match banner.map(|props| string_at(props, "color")).as_deref() {
                Some("error") => "the error",
                _ => "any problems",
            };
            (
                analysis_prompt(resource),
                Some(format!(
                    "Hey Liz, please analyse the **\"{label}\"** message and troubleshoot {target}."
                )),
            )
        }
        _ => (DEFAULT_PROMPT.to_string(), None),
    };

    let mut contexts = global_context.to_vec();
    let mut resource_context = Context::new(
        if kind.is_empty() {
            "resource".to_string()
        } else {
            kind.to_lowercase()
        },
        name.clone(),
    )
    .with_description(kind.clone());
    if let Some(icon) = &hook_context.icon {
        resource_context = resource_context.with_icon(icon.clone());
    }
    contexts.push(resource_context);

    let namespace = string_at(resource, "namespace");
    if !namespace.is_empty() {
        contexts.push(
            Context::new(NAMESPACE_TAG, namespace)
                .with_description("Namespace")
                .with_icon("icon-namespace"),
        );
    }

    let mut message = NewMessage::user(prompt).with_contexts(dedupe_contexts(contexts));
    message.summary_content = summary;
    message
}

fn analysis_prompt(resource: &Value) -> String {
    let state = string_at(resource, "state");
    let kind = string_at(resource, "kind");
    let name = string_at(resource, "name");

    let mut prompt = format!("Explain what the '{state}' state means for the {kind}: {name}.");
    if HEALTHY_STATES.contains(&state.as_str()) {
        prompt.push_str("\n  - Confirm that this is the expected state and what it implies.");
    } else {
        prompt.push_str(
            "\n  - Identify the cause of the issue: analyze the resource status and the associated events and determine the most likely reason it is in this state.\
             \n  - Provide a numbered list of actions to fix the issue.",
        );
    }
    prompt
}

fn string_at(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
