//! Text helpers for logs and console previews.

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char
/// boundary. City names and user questions are often non-ASCII.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

/// One-line preview: newlines become spaces, and a cut text ends in `...`.
pub fn preview(text: &str, max_bytes: usize) -> String {
    let single_line = text.replace('\n', " ");
    let cut = truncate_str(&single_line, max_bytes);
    if cut.len() < single_line.len() {
        format!("{}...", cut)
    } else {
        single_line
    }
}
