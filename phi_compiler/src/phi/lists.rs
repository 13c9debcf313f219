//! List tokenizer
//!
//! Splits a section's raw text into atomic tokens on commas and/or whitespace,
//! uniformly, so comma- and space-separated lists normalize to the same token
//! sequence. Used for the `S:`, `V:`, and `F:` sections.

/// Split a raw section text into tokens: commas first, then whitespace runs,
/// dropping empties. `"a, b c"` and `"a b, c"` both yield `[a, b, c]`.
pub fn split_list(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in text.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        for token in chunk.split_whitespace() {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// First whitespace-delimited token of a text, if any. Extra tokens are
/// ignored, not an error.
pub fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_and_space_mixing_normalize_identically() {
        assert_eq!(split_list("a, b c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a b, c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a   b   c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(split_list("a,, b , ,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,, ").is_empty());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        assert_eq!(split_list("cust, cust prod"), vec!["cust", "cust", "prod"]);
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("2 extra tokens"), Some("2"));
        assert_eq!(first_token("  3  "), Some("3"));
        assert_eq!(first_token("   "), None);
        assert_eq!(first_token(""), None);
    }
}
