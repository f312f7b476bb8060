//! Phone number recovery from free text

use regex::Regex;
use std::sync::LazyLock;

/// Optional +1/1 prefix, optional (parenthesized) area code, exchange, line.
/// Separators may be a space, dot or hyphen.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?(?:\(?\d{3}\)?[-.\s]?)?\d{3}[-.\s]?\d{4}")
        .expect("phone pattern is valid")
});

/// Find phone-like substrings in `text`.
///
/// Matches are returned raw, de-duplicated, in first-seen order. No match
/// yields an empty vector.
pub fn find_phone_numbers(text: &str) -> Vec<String> {
    let mut phones: Vec<String> = Vec::new();

    for m in PHONE_RE.find_iter(text) {
        let phone = m.as_str();
        if !phones.iter().any(|p| p == phone) {
            phones.push(phone.to_string());
        }
    }

    phones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_formats_are_kept() {
        let phones = find_phone_numbers("Call 646-744-6519 or 646.744.6519");
        assert_eq!(phones, vec!["646-744-6519", "646.744.6519"]);
    }

    #[test]
    fn test_repeated_number_is_deduplicated() {
        let phones = find_phone_numbers("646-744-6519, again 646-744-6519 and 212 555 0199");
        assert_eq!(phones, vec!["646-744-6519", "212 555 0199"]);
    }

    #[test]
    fn test_country_code_and_parens() {
        let phones = find_phone_numbers("text +1 (917) 555-0123 now");
        assert_eq!(phones, vec!["+1 (917) 555-0123"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(find_phone_numbers("no digits here, only 12 34").is_empty());
        assert!(find_phone_numbers("").is_empty());
    }
}
