use crate::tags::Tag;

/// Upper bound on pairs removed by one extraction pass. Pairs beyond the
/// bound stay in the content and are picked up by the next pass.
pub const MAX_SUGGESTIONS_PER_PASS: usize = 64;

/// Move every complete `<suggestion>…</suggestion>` region out of `content`.
///
/// Matches are taken left to right, each from the first start marker to the
/// first end marker after it. Inner text is trimmed and appended to
/// `suggestions`; the remainder is trimmed after every removal. Content with
/// no complete pair is returned untouched.
pub fn extract_suggestions(mut suggestions: Vec<String>, content: &str) -> (Vec<String>, String) {
    let start = Tag::SuggestionStart.as_str();
    let end = Tag::SuggestionEnd.as_str();
    let mut remaining = content.to_string();

    for _ in 0..MAX_SUGGESTIONS_PER_PASS {
        let Some(open) = remaining.find(start) else {
            break;
        };
        let inner_start = open + start.len();
        let Some(relative_close) = remaining[inner_start..].find(end) else {
            break;
        };
        let close = inner_start + relative_close;

        suggestions.push(remaining[inner_start..close].trim().to_string());
        remaining.replace_range(open..close + end.len(), "");
        remaining = remaining.trim().to_string();

        if remaining.is_empty() {
            break;
        }
    }

    (suggestions, remaining)
}
