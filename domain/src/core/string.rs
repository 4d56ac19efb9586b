//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Take the first `max_chars` characters of a string.
///
/// Counts Unicode scalar values, not bytes, so a preview never splits a
/// character and never exceeds `max_chars` characters.
pub fn take_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'の' is 3 bytes; cutting inside it backs up to the previous boundary
        assert_eq!(truncate("あのねあのね", 8), "あ...");
    }

    #[test]
    fn test_take_chars_counts_characters() {
        assert_eq!(take_chars("hello world", 5), "hello");
        assert_eq!(take_chars("あのね", 2), "あの");
        assert_eq!(take_chars("short", 100), "short");
        assert_eq!(take_chars("", 3), "");
    }

    #[test]
    fn test_take_chars_exact_length() {
        let s = "x".repeat(100);
        assert_eq!(take_chars(&s, 100).chars().count(), 100);
        let longer = "y".repeat(250);
        assert_eq!(take_chars(&longer, 100).chars().count(), 100);
    }
}
