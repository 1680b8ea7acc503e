use chat_protocol::{
    decode_confirmation_action, decode_error_payload, decode_resource_links,
    validate_action_resource, ActionResource, ActionType, DecodeError, ResourceLinkAction,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn pod(name: &str) -> ResourceLinkAction {
    ResourceLinkAction {
        action_type: ActionType::Button,
        label: format!("View Pod: {name}"),
        resource: ActionResource {
            kind: "Pod".to_string(),
            resource_type: "pod".to_string(),
            name: name.to_string(),
            namespace: "default".to_string(),
            cluster: "local".to_string(),
        },
    }
}

#[test]
fn resource_links_decode_single_quoted_object() {
    let raw = "<mcp-response>{'kind': 'Pod', 'type': 'pod', 'name': 'web-0', 'namespace': 'default', 'cluster': 'local'}</mcp-response>";

    assert_eq!(decode_resource_links(raw), vec![pod("web-0")]);
}

#[test]
fn resource_links_expand_name_lists_and_arrays() {
    let raw = r#"<mcp-response>[
        {"kind": "Pod", "type": "pod", "name": ["web-0", "web-1"], "namespace": "default", "cluster": "local"},
        {"kind": "Pod", "type": "pod", "name": "web-2", "namespace": "default", "cluster": "local"}
    ]</mcp-response>"#;

    assert_eq!(
        decode_resource_links(raw),
        vec![pod("web-0"), pod("web-1"), pod("web-2")]
    );
}

#[test]
fn resource_links_missing_namespace_decode_to_nothing() {
    let raw = "<mcp-response>{'kind': 'Pod', 'type': 'pod', 'name': 'web-0', 'cluster': 'local'}</mcp-response>";

    assert!(decode_resource_links(raw).is_empty());
}

#[test]
fn resource_links_invalid_element_does_not_affect_siblings() {
    let raw = r#"<mcp-response>[
        {"kind": "Pod", "type": "pod", "name": "web-0", "namespace": null, "cluster": "local"},
        {"kind": "Pod", "type": "pod", "name": "web-1", "namespace": "default", "cluster": "local"}
    ]</mcp-response>"#;

    assert_eq!(decode_resource_links(raw), vec![pod("web-1")]);
}

#[test]
fn resource_links_malformed_json_decodes_to_nothing() {
    assert!(decode_resource_links("<mcp-response>{not json</mcp-response>").is_empty());
    assert!(decode_resource_links("<mcp-response></mcp-response>").is_empty());
}

#[test]
fn resource_links_decoding_is_idempotent() {
    let raw = "<mcp-response>{'kind': 'Pod', 'type': 'pod', 'name': ['a', 'b'], 'namespace': 'default', 'cluster': 'local'}</mcp-response>";

    let first = decode_resource_links(raw);
    let second = decode_resource_links(raw);

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn validation_reports_first_missing_field() {
    let error = validate_action_resource(&json!({
        "kind": "Pod",
        "name": "web-0",
        "cluster": "local",
        "type": "pod",
    }))
    .expect_err("namespace is required");

    assert!(matches!(error, DecodeError::MissingField("namespace")));
}

#[test]
fn validation_rejects_non_string_names() {
    let error = validate_action_resource(&json!({
        "kind": "Pod",
        "name": ["web-0", 3],
        "namespace": "default",
        "cluster": "local",
        "type": "pod",
    }))
    .expect_err("numeric names are rejected");

    assert!(matches!(error, DecodeError::InvalidField("name")));
    assert!(matches!(
        validate_action_resource(&json!("Pod")),
        Err(DecodeError::NotAnObject)
    ));
}

#[test]
fn confirmation_decodes_single_quoted_payload() {
    let raw = "<confirmation-response>{'type': 'delete', 'resource': {'kind': 'Pod', 'name': 'web-0', 'namespace': 'default'}, 'payload': [{'op': 'remove', 'path': '/spec'}], 'cluster': 'local'}</confirmation-response>";

    let action = decode_confirmation_action(raw).expect("confirmation should decode");

    assert_eq!(action.operation_name(), Some("delete"));
    assert_eq!(action.resource_field("kind"), Some("Pod"));
    assert_eq!(action.operations().len(), 1);
    assert_eq!(action.extra.get("cluster"), Some(&json!("local")));
}

#[test]
fn confirmation_rejects_non_objects_and_garbage() {
    assert!(decode_confirmation_action("<confirmation-response>null</confirmation-response>").is_none());
    assert!(decode_confirmation_action("<confirmation-response>[1, 2]</confirmation-response>").is_none());
    assert!(decode_confirmation_action("<confirmation-response>{op:'delete'}</confirmation-response>").is_none());
}

#[test]
fn confirmation_keeps_non_string_type_verbatim() {
    let action = decode_confirmation_action(
        "<confirmation-response>{'type': 1, 'resource': {'kind': 'Pod', 'name': 'web-0'}}</confirmation-response>",
    )
    .expect("any object decodes");

    assert_eq!(action.operation, Some(json!(1)));
    assert_eq!(action.operation_name(), None);
    assert_eq!(action.resource_field("name"), Some("web-0"));
}

#[test]
fn confirmation_without_patch_list_has_no_operations() {
    let action = decode_confirmation_action(
        r#"<confirmation-response>{"type": "create", "payload": {"kind": "Namespace"}}</confirmation-response>"#,
    )
    .expect("object payload decodes");

    assert!(action.operations().is_empty());
    assert_eq!(action.resource_field("kind"), None);
}

#[test]
fn error_payload_is_trimmed_text() {
    assert_eq!(
        decode_error_payload("<error>  model quota exceeded\n</error>"),
        "model quota exceeded"
    );
}
