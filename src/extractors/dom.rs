//! DOM helpers shared by the page extractors
//!
//! Selector chains model the "try this markup, else that markup" matching the
//! target site needs: an ordered list of CSS selectors evaluated until one of
//! them matches.

use scraper::{ElementRef, Html, Selector};

/// Ordered list of CSS selectors, tried in priority order
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Build a chain from selector strings.
    ///
    /// Patterns that fail to parse are skipped, so a chain never panics at
    /// match time.
    pub fn new(patterns: &[&str]) -> Self {
        let selectors = patterns
            .iter()
            .filter_map(|p| Selector::parse(p).ok())
            .collect();
        Self { selectors }
    }

    /// First element matched by the highest-priority selector that matches anything
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| scope.select(selector).next())
    }

    /// First match anywhere in the document
    pub fn first_in<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
    }

    /// All elements of the first selector that yields at least one element.
    ///
    /// Later selectors are never consulted once an earlier one matched, which
    /// keeps results from two markup generations from mixing.
    pub fn all_in<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        for selector in &self.selectors {
            let found: Vec<ElementRef<'a>> = document.select(selector).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Text of the first element per selector, taking the first non-blank one.
    ///
    /// Unlike [`SelectorChain::first_in`], a present but empty element does not
    /// stop the chain.
    pub fn first_text_in(&self, document: &Html) -> Option<String> {
        self.selectors
            .iter()
            .find_map(|selector| non_empty_text(document.select(selector).next()))
    }
}

/// Text content with each text node trimmed and joined by single spaces.
///
/// Line breaks inside a single text node survive, which line-oriented
/// patterns (compensation lines) rely on.
pub fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element text, or `None` when the element is missing or blank
pub fn non_empty_text(element: Option<ElementRef>) -> Option<String> {
    element.map(element_text).filter(|t| !t.is_empty())
}

/// Strip surrounding parentheses, e.g. `(Upper East Side)`
pub fn strip_parens(text: &str) -> &str {
    text.trim_matches(|c| c == '(' || c == ')')
}

/// Content of the first `<meta property="...">` tag with non-empty content
pub fn meta_property(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse("meta[property]").ok()?;

    document
        .select(&selector)
        .filter(|el| el.value().attr("property") == Some(property))
        .find_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
}

/// Push `value` unless an equal value is already present
pub fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}
