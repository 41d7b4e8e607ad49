// ── Action input parsing ──

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Parse a comma-separated id list (`"1, 2,x"`), keeping only the
/// positive integers and dropping every other token.
pub fn parse_id_list(input: &str) -> Vec<i64> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .collect()
}

/// Loose syntactic check of an email address.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists() {
        assert_eq!(parse_id_list("1, 2,x"), vec![1, 2]);
        assert_eq!(parse_id_list(" 3 ,, -4, 0, 5.0, 6"), vec![3, 6]);
        assert!(parse_id_list("").is_empty());
        assert!(parse_id_list("abc").is_empty());
    }

    #[test]
    fn email_addresses() {
        assert!(is_valid_email("viewer@example.com"));
        assert!(is_valid_email("first.last+media@mail.example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
