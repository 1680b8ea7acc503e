//! Replay scripts.
//!
//! One step per line:
//! - a JSON string literal is a fragment streamed by the agent,
//! - `> text` sends `text` as a user prompt,
//! - `!yes` / `!no` answers the latest pending confirmation.
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Fragment(String),
    Prompt(String),
    Confirm(bool),
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: fragment is not a JSON string: {source}")]
    Fragment {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: unknown directive `{directive}`")]
    Directive { line: usize, directive: String },
}

pub fn load(path: &Path) -> Result<Vec<Step>, ScriptError> {
    let source = fs::read_to_string(path)?;
    parse(&source)
}

pub fn parse(source: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(prompt) = trimmed.strip_prefix('>') {
            steps.push(Step::Prompt(prompt.trim().to_string()));
            continue;
        }

        if let Some(directive) = trimmed.strip_prefix('!') {
            let accepted = match directive {
                "yes" => true,
                "no" => false,
                other => {
                    return Err(ScriptError::Directive {
                        line,
                        directive: other.to_string(),
                    })
                }
            };
            steps.push(Step::Confirm(accepted));
            continue;
        }

        let fragment: String = serde_json::from_str(trimmed)
            .map_err(|source| ScriptError::Fragment { line, source })?;
        steps.push(Step::Fragment(fragment));
    }

    Ok(steps)
}
