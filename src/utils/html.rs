//! Text cleanup for content scraped out of HTML.

/// Collapse every run of whitespace (including non-breaking spaces) into a
/// single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop lines that are empty or contain only whitespace.
pub fn strip_blank_lines(s: &str) -> String {
    s.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  ПАО\n\t«Газпром»  "), "ПАО «Газпром»");
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_strip_blank_lines() {
        assert_eq!(strip_blank_lines("one\n\n  \ntwo\r\n\nthree\n"), "one\ntwo\nthree");
        assert_eq!(strip_blank_lines(""), "");
    }
}
