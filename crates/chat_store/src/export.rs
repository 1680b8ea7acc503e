use std::fmt::Write as _;

use time::format_description::well_known::Rfc3339;
use time::Date;

use crate::error::ExportError;
use crate::schema::Message;

/// File name for an exported transcript: `chat-{session}_{YYYY-MM-DD}.txt`.
pub fn transcript_file_name(session_id: &str, date: Date) -> String {
    format!("chat-{session_id}_{date}.txt")
}

/// Render messages as a plain-text transcript, one block per message.
pub fn format_transcript<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
) -> Result<String, ExportError> {
    let mut blocks = Vec::new();

    for message in messages {
        let timestamp = message.timestamp.format(&Rfc3339)?;
        let mut block = format!(
            "[{timestamp}] {}: {}",
            message.role.label(),
            message.message_content
        );

        if let Some(summary) = &message.summary_content {
            let _ = write!(block, "\n  Summary: {summary}");
        }
        if let Some(suggestions) = message
            .suggestion_actions
            .as_ref()
            .filter(|suggestions| !suggestions.is_empty())
        {
            let _ = write!(block, "\n  Suggestions: {}", suggestions.join(" | "));
        }
        if let Some(confirmation) = &message.confirmation {
            let operation = confirmation.action.operation_name().unwrap_or("action");
            let _ = write!(
                block,
                "\n  Confirmation: {operation} ({})",
                confirmation.status.as_str()
            );
        }

        blocks.push(block);
    }

    Ok(blocks.join("\n\n"))
}
