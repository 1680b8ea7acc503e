/// Literal delimiter recognized inside the fragment stream.
///
/// Tags carry no attributes and never nest. Matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    MessageStart,
    MessageEnd,
    ThinkingStart,
    ThinkingEnd,
    McpResponseStart,
    McpResponseEnd,
    ConfirmationStart,
    ConfirmationEnd,
    SuggestionStart,
    SuggestionEnd,
    ErrorStart,
    ErrorEnd,
}

impl Tag {
    pub const ALL: [Tag; 12] = [
        Self::MessageStart,
        Self::MessageEnd,
        Self::ThinkingStart,
        Self::ThinkingEnd,
        Self::McpResponseStart,
        Self::McpResponseEnd,
        Self::ConfirmationStart,
        Self::ConfirmationEnd,
        Self::SuggestionStart,
        Self::SuggestionEnd,
        Self::ErrorStart,
        Self::ErrorEnd,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "<message>" => Self::MessageStart,
            "</message>" => Self::MessageEnd,
            "<think>" => Self::ThinkingStart,
            "</think>" => Self::ThinkingEnd,
            "<mcp-response>" => Self::McpResponseStart,
            "</mcp-response>" => Self::McpResponseEnd,
            "<confirmation-response>" => Self::ConfirmationStart,
            "</confirmation-response>" => Self::ConfirmationEnd,
            "<suggestion>" => Self::SuggestionStart,
            "</suggestion>" => Self::SuggestionEnd,
            "<error>" => Self::ErrorStart,
            "</error>" => Self::ErrorEnd,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageStart => "<message>",
            Self::MessageEnd => "</message>",
            Self::ThinkingStart => "<think>",
            Self::ThinkingEnd => "</think>",
            Self::McpResponseStart => "<mcp-response>",
            Self::McpResponseEnd => "</mcp-response>",
            Self::ConfirmationStart => "<confirmation-response>",
            Self::ConfirmationEnd => "</confirmation-response>",
            Self::SuggestionStart => "<suggestion>",
            Self::SuggestionEnd => "</suggestion>",
            Self::ErrorStart => "<error>",
            Self::ErrorEnd => "</error>",
        }
    }

    /// Returns true for the four tags that arrive as standalone fragments and
    /// drive the message lifecycle.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::MessageStart | Self::MessageEnd | Self::ThinkingStart | Self::ThinkingEnd
        )
    }
}

/// One fragment after literal classification.
///
/// Payload variants borrow the whole fragment, markers included; decoders
/// strip the markers themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    Control(Tag),
    ResourceLinks(&'a str),
    Confirmation(&'a str),
    Error(&'a str),
    Text(&'a str),
}

/// Classify a raw fragment by its literal content.
///
/// Payload regions are tested in a fixed order: resource links, then
/// confirmation, then error.
pub fn classify_fragment(fragment: &str) -> Fragment<'_> {
    if let Some(tag) = Tag::parse(fragment).filter(Tag::is_control) {
        return Fragment::Control(tag);
    }

    if is_wrapped(fragment, Tag::McpResponseStart, Tag::McpResponseEnd) {
        return Fragment::ResourceLinks(fragment);
    }
    if is_wrapped(fragment, Tag::ConfirmationStart, Tag::ConfirmationEnd) {
        return Fragment::Confirmation(fragment);
    }
    if is_wrapped(fragment, Tag::ErrorStart, Tag::ErrorEnd) {
        return Fragment::Error(fragment);
    }

    Fragment::Text(fragment)
}

fn is_wrapped(fragment: &str, start: Tag, end: Tag) -> bool {
    let (start, end) = (start.as_str(), end.as_str());
    fragment.len() >= start.len() + end.len()
        && fragment.starts_with(start)
        && fragment.ends_with(end)
}
