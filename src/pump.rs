//! Delivery of transport events to the chat service, strictly in order.

use chat_transport::{Transport, TransportEvent};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::service::ChatService;

/// Apply one event. Failures are logged; they never stop the stream.
pub fn apply_event(service: &mut ChatService, transport: &dyn Transport, event: TransportEvent) {
    let session_id = event.session_id().to_string();
    if let Err(error) = service.handle_event(event, transport) {
        tracing::error!(%session_id, %error, "failed to handle transport event");
    }
}

/// Apply already-received events in order. Returns the number applied.
pub fn drain(
    service: &mut ChatService,
    transport: &dyn Transport,
    events: impl IntoIterator<Item = TransportEvent>,
) -> usize {
    let mut applied = 0;
    for event in events {
        apply_event(service, transport, event);
        applied += 1;
    }
    applied
}

/// Apply every event currently buffered in `receiver` without waiting.
///
/// Events emitted while draining, such as replies to a frame sent by the
/// service, are applied in the same call.
pub fn drain_pending(
    service: &mut ChatService,
    transport: &dyn Transport,
    receiver: &mut UnboundedReceiver<TransportEvent>,
) -> usize {
    let mut applied = 0;
    while let Ok(event) = receiver.try_recv() {
        apply_event(service, transport, event);
        applied += 1;
    }
    applied
}

/// Apply events until the channel closes. Returns the number applied.
pub async fn run(
    service: &mut ChatService,
    transport: &dyn Transport,
    mut receiver: UnboundedReceiver<TransportEvent>,
) -> usize {
    let mut applied = 0;
    while let Some(event) = receiver.recv().await {
        apply_event(service, transport, event);
        applied += 1;
    }
    tracing::debug!(applied, "transport event stream ended");
    applied
}
