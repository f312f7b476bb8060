//! Category detection from listing URLs
//!
//! The site encodes categories as short path codes, e.g. `/search/ggg` or
//! `/mnh/fbh/7537123456.html`.

use url::Url;

/// Site category codes and their labels
const CATEGORY_CODES: &[(&str, &str)] = &[
    ("ggg", "gigs"),
    ("jjj", "jobs"),
    ("fbh", "jobs"),
    ("ofc", "jobs"),
    ("egr", "jobs"),
    ("etc", "jobs"),
    ("roo", "housing"),
    ("apa", "housing"),
    ("sub", "housing"),
    ("rea", "housing"),
    ("evg", "events"),
    ("com", "community"),
    ("res", "resumes"),
    ("bbb", "services"),
    ("sss", "for sale"),
    ("sale", "for sale"),
];

/// Map a category code to its label
pub fn category_label(code: &str) -> Option<&'static str> {
    CATEGORY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// Derive a human category label from a search or post URL.
///
/// Uses the segment after `/search/` when present, otherwise the second path
/// segment. Relative paths are accepted. Unknown codes yield `None`.
pub fn detect_category_from_url(url: &str) -> Option<&'static str> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    };

    let code = match path.split_once("/search/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
        None => path.split('/').filter(|p| !p.is_empty()).nth(1).unwrap_or_default(),
    };

    category_label(code.trim())
}
