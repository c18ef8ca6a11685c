//! # Greedy Word Wrap
//!
//! Breaks a summary string into at most `max_lines` lines that each fit a
//! pixel budget. Width measurement is supplied by the caller so the same
//! routine runs against real glyph advances in production and against
//! synthetic metrics in tests.
//!
//! Words are never split. A word wider than the budget still gets a line of
//! its own, and words that would need a line past `max_lines` are dropped.

/// Wrap `text` into lines no wider than `max_width` pixels.
///
/// `width_of` returns the rendered width of a candidate line in pixels.
///
/// # Example
/// ```
/// use weatherstation_lib::text_wrap::wrap_text;
///
/// let width_of = |s: &str| s.split_whitespace().count() as u32 * 30;
/// let lines = wrap_text("One two three four", width_of, 70, 3);
/// assert_eq!(lines, vec!["One two", "three four"]);
/// ```
pub fn wrap_text<F>(text: &str, width_of: F, max_width: u32, max_lines: usize) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines = Vec::with_capacity(max_lines);
    if max_lines == 0 {
        return lines;
    }

    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if width_of(candidate.as_str()) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() >= max_lines {
                return lines;
            }
        }
        current = word.to_string();
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

/// Number of whitespace-separated words across all `lines`.
pub fn word_count<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .map(|l| l.as_ref().split_whitespace().count())
        .sum()
}

/// Vertical advance between wrapped lines.
///
/// `descent` is the positive distance below the baseline.
pub fn line_height(ascent: u32, descent: u32, spacing: u32) -> u32 {
    ascent + descent + spacing
}
