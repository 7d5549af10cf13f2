//! Helpers shared by the record filter composers.

/// Trimmed query parameter, `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Lowercased `LIKE` pattern matching `needle` anywhere; wildcards in the
/// needle are escaped with the default backslash escape.
pub fn like_contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  chess ")), Some("chess"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Chess Club", "chess"));
        assert!(contains_ignore_case("Tech, Gaming", "GAMING"));
        assert!(!contains_ignore_case("Chess Club", "debate"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_contains_pattern("Chess"), "%chess%");
        assert_eq!(like_contains_pattern("100%_fun"), "%100\\%\\_fun%");
    }
}
