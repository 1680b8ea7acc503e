use chat_store::SessionStore;
use console_chat::{
    AssemblerOptions, ConfirmationStatus, Message, MessagePhase, MessageTemplate, Role,
    SessionErrorKind, StreamAssembler,
};
use pretty_assertions::assert_eq;

const SESSION: &str = "default";

struct Harness {
    store: SessionStore,
    assembler: StreamAssembler,
}

impl Harness {
    fn new() -> Self {
        Self::with_options(AssemblerOptions::default())
    }

    fn with_options(options: AssemblerOptions) -> Self {
        let mut store = SessionStore::new();
        store.init(SESSION);
        Self {
            store,
            assembler: StreamAssembler::new(SESSION, options),
        }
    }

    /// Session whose welcome turn already completed, so fragments build
    /// assistant turns.
    fn after_welcome() -> Self {
        let mut harness = Self::new();
        harness.feed(&["<message>", "Welcome!", "</message>"]);
        harness
    }

    fn feed(&mut self, fragments: &[&str]) {
        for fragment in fragments {
            self.assembler.on_fragment(&mut self.store, fragment);
        }
    }

    fn messages(&self) -> Vec<&Message> {
        self.store.messages(SESSION).collect()
    }

    fn last(&self) -> &Message {
        self.store
            .messages(SESSION)
            .last()
            .expect("session should have a message")
    }

    fn phase(&self) -> MessagePhase {
        self.store.phase(SESSION)
    }
}

#[test]
fn welcome_turn_is_a_templated_system_message() {
    let mut harness = Harness::with_options(AssemblerOptions {
        expand_thinking: false,
        principal: Some("admin".to_string()),
    });

    harness.feed(&["<message>", "Hi, I am your assistant."]);
    assert_eq!(harness.phase(), MessagePhase::Initializing);

    harness.feed(&["<suggestion>List pods</suggestion>", "</message>"]);

    let messages = harness.messages();
    assert_eq!(messages.len(), 1);
    let welcome = messages[0];
    assert_eq!(welcome.role, Role::System);
    assert_eq!(
        welcome.template,
        Some(MessageTemplate::Welcome {
            principal: Some("admin".to_string())
        })
    );
    assert_eq!(welcome.message_content, "Hi, I am your assistant.");
    assert_eq!(welcome.suggestion_actions, Some(vec!["List pods".to_string()]));
    assert_eq!(welcome.completed, Some(true));
    assert_eq!(harness.phase(), MessagePhase::Idle);
}

#[test]
fn welcome_error_payload_raises_protocol_error() {
    let mut harness = Harness::new();

    harness.feed(&["<message>", "<error>agent is not configured</error>"]);

    let error = harness.store.error(SESSION).expect("error should be stored");
    assert_eq!(error.kind, SessionErrorKind::Protocol);
    assert_eq!(error.message, "agent is not configured");
    assert_eq!(
        harness.store.session(SESSION).map(|s| s.stored_phase()),
        Some(MessagePhase::Idle)
    );
}

#[test]
fn plain_message_assembles_across_fragments() {
    let mut harness = Harness::after_welcome();

    harness.feed(&["<message>", "Hello ", "world", "</message>"]);

    let messages = harness.messages();
    assert_eq!(messages.len(), 2);
    let reply = messages[1];
    assert_eq!(reply.id, 2);
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.message_content, "Hello world");
    assert_eq!(reply.completed, Some(true));
    assert!(!reply.thinking);
    assert_eq!(harness.phase(), MessagePhase::Idle);
}

#[test]
fn reasoning_region_is_kept_apart_from_body() {
    let mut harness = Harness::after_welcome();

    harness.feed(&["<message>", "<think>"]);
    assert_eq!(harness.phase(), MessagePhase::Thinking);
    assert!(harness.last().thinking);

    harness.feed(&["step one"]);
    assert_eq!(harness.phase(), MessagePhase::Thinking);

    harness.feed(&["</think>"]);
    assert_eq!(harness.phase(), MessagePhase::GeneratingResponse);

    harness.feed(&["final answer", "</message>"]);

    let reply = harness.last();
    assert_eq!(reply.thinking_content.as_deref(), Some("step one"));
    assert_eq!(reply.message_content, "final answer");
    assert!(!reply.thinking);
    assert_eq!(reply.completed, Some(true));
}

#[test]
fn leading_whitespace_fragments_are_dropped() {
    let mut harness = Harness::after_welcome();

    harness.feed(&[
        "<message>", "<think>", "\n", "idea", "</think>", "   ", "real", " ", "text", "</message>",
    ]);

    let reply = harness.last();
    assert_eq!(reply.thinking_content.as_deref(), Some("idea"));
    assert_eq!(reply.message_content, "real text");
}

#[test]
fn trailing_line_breaks_are_stripped_on_end() {
    let mut harness = Harness::after_welcome();

    harness.feed(&["<message>", "Done.", "\r\n\n", "</message>"]);

    assert_eq!(harness.last().message_content, "Done.");
}

#[test]
fn suggestions_are_extracted_from_accumulated_content() {
    let mut harness = Harness::after_welcome();

    harness.feed(&[
        "<message>",
        "Pick one",
        "<sugg",
        "estion>A</suggestion>",
        "<suggestion>B</suggestion>",
    ]);

    let reply = harness.last();
    assert_eq!(
        reply.suggestion_actions,
        Some(vec!["A".to_string(), "B".to_string()])
    );
    assert_eq!(reply.message_content, "Pick one");
}

#[test]
fn confirmation_payload_completes_the_turn() {
    let mut harness = Harness::after_welcome();

    harness.feed(&[
        "<message>",
        "I will delete the pod.",
        "<confirmation-response>{'type': 'delete', 'resource': {'kind': 'Pod', 'name': 'web-0', 'namespace': 'default'}, 'payload': []}</confirmation-response>",
    ]);

    let reply = harness.last();
    let confirmation = reply
        .confirmation
        .as_ref()
        .expect("confirmation should be decoded");
    assert_eq!(confirmation.status, ConfirmationStatus::Pending);
    assert_eq!(confirmation.action.operation_name(), Some("delete"));
    assert_eq!(confirmation.action.resource_field("name"), Some("web-0"));
    assert_eq!(reply.completed, Some(true));
    assert!(!reply.thinking);
    assert_eq!(reply.message_content, "I will delete the pod.");
    assert_eq!(harness.phase(), MessagePhase::AwaitingConfirmation);
}

#[test]
fn confirmation_with_numeric_type_is_still_pending() {
    let mut harness = Harness::after_welcome();

    harness.feed(&[
        "<message>",
        "<confirmation-response>{'type': 1, 'resource': {'kind': 'Pod', 'name': 'web-0'}}</confirmation-response>",
    ]);

    let reply = harness.last();
    assert!(reply.has_pending_confirmation());
    assert_eq!(reply.message_content, "");
    assert_eq!(harness.phase(), MessagePhase::AwaitingConfirmation);
}

#[test]
fn undecodable_confirmation_is_appended_as_text() {
    let mut harness = Harness::after_welcome();
    let payload = "<confirmation-response>not json</confirmation-response>";

    harness.feed(&["<message>", payload]);

    let reply = harness.last();
    assert!(reply.confirmation.is_none());
    assert_eq!(reply.message_content, payload);
    assert_eq!(reply.completed, Some(false));
}

#[test]
fn resource_links_are_decoded_and_hidden() {
    let mut harness = Harness::after_welcome();

    harness.feed(&[
        "<message>",
        "Found it.",
        "<mcp-response>[{'kind': 'Pod', 'type': 'pod', 'name': ['web-0', 'web-1'], 'namespace': 'default', 'cluster': 'local'}]</mcp-response>",
        "</message>",
    ]);

    let reply = harness.last();
    let actions = reply
        .related_resources_actions
        .as_ref()
        .expect("actions should be stored");
    let labels: Vec<&str> = actions.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, vec!["View Pod: web-0", "View Pod: web-1"]);
    assert_eq!(reply.message_content, "Found it.");
}

#[test]
fn malformed_resource_links_decode_to_empty_list_without_error() {
    let mut harness = Harness::after_welcome();

    harness.feed(&[
        "<message>",
        "Found it.",
        "<mcp-response>{'kind': 'Pod', 'type': 'pod', 'name': 'web-0', 'cluster': 'local'}</mcp-response>",
    ]);

    assert_eq!(harness.last().related_resources_actions, Some(Vec::new()));
    assert!(harness.store.error(SESSION).is_none());
}

#[test]
fn error_payload_sets_session_error_and_processing_continues() {
    let mut harness = Harness::after_welcome();

    harness.feed(&["<message>", "Working", "<error>model quota exceeded</error>"]);

    let error = harness.store.error(SESSION).expect("error should be stored");
    assert_eq!(error.kind, SessionErrorKind::Protocol);
    assert_eq!(error.message, "model quota exceeded");
    assert_eq!(harness.phase(), MessagePhase::Idle);
    assert_eq!(harness.last().message_content, "Working");

    harness.feed(&[" on it", "</message>"]);

    let reply = harness.last();
    assert_eq!(reply.message_content, "Working on it");
    assert_eq!(reply.completed, Some(true));
}

#[test]
fn message_start_finishes_an_unterminated_message() {
    let mut harness = Harness::after_welcome();

    harness.feed(&["<message>", "partial", "<message>", "next", "</message>"]);

    let messages = harness.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].message_content, "partial");
    assert_eq!(messages[1].completed, Some(true));
    assert_eq!(messages[2].message_content, "next");
    assert_eq!(
        messages.iter().filter(|m| m.completed == Some(false)).count(),
        0
    );
}

#[test]
fn fragments_without_an_open_message_are_dropped() {
    let mut harness = Harness::after_welcome();

    harness.feed(&["stray", "<think>", "</message>"]);

    assert_eq!(harness.messages().len(), 1);
    assert_eq!(harness.last().message_content, "Welcome!");
    assert!(harness.store.error(SESSION).is_none());
}

#[test]
fn ids_increase_by_one_per_turn() {
    let mut harness = Harness::after_welcome();

    for _ in 0..3 {
        harness.feed(&["<message>", "ok", "</message>"]);
    }

    let ids: Vec<u64> = harness.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn expand_thinking_option_applies_to_new_turns() {
    let mut harness = Harness::with_options(AssemblerOptions {
        expand_thinking: true,
        principal: None,
    });
    harness.feed(&["<message>", "Welcome!", "</message>", "<message>"]);

    assert!(harness.last().show_thinking);
    assert_eq!(harness.last().thinking_content.as_deref(), Some(""));
}

#[test]
fn uninitialised_session_ignores_fragments() {
    let mut store = SessionStore::new();
    let mut assembler = StreamAssembler::new("missing", AssemblerOptions::default());

    assembler.on_fragment(&mut store, "<message>");

    assert!(!store.is_initialized("missing"));
    assert_eq!(assembler.current_message_id(), None);
}
