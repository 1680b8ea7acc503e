/// Normalise prompt text typed by the user: blank lines are dropped and the
/// result is trimmed.
pub fn clean_input(value: &str) -> String {
    value
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
