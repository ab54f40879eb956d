//! Greedy word wrapping against a pixel budget.

/// Wraps `text` into lines no wider than `max_width` according to `measure`.
///
/// Words are never broken: a word wider than the budget sits on a line of
/// its own and overflows. The last line is always emitted, so empty input
/// yields a single empty line.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}
