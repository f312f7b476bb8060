//! Search/list page extraction
//!
//! The site has shipped several markup generations for result rows. Rows are
//! located with a selector chain and each field is read through its own
//! chain, so a new layout only needs new selectors appended.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use super::dom::{non_empty_text, strip_parens, SelectorChain};
use super::phone_extractor::find_phone_numbers;
use crate::category::detect_category_from_url;
use crate::record::ListItem;

static ROW_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[".result-row", "li.cl-search-result", "ul.rows li.result-row"])
});
static LINK_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["a.result-title", "a.cl-app-anchor", "a[href]"]));
static TIME_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["time", ".result-date"]));
static PRICE_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".result-price", ".price"]));
static HOOD_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".result-hood", ".nearby"]));
static CATEGORY_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".category", "[data-cat]"]));
static SNIPPET_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".result-description", ".snippet"]));

static URL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)\.html").expect("id pattern is valid"));

/// Numeric post id from a `/<digits>.html` URL path
pub fn id_from_url(url: &str) -> Option<String> {
    URL_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a search results page into items, in document order.
///
/// Rows without both a url and a title are dropped. An empty or unrelated
/// document yields an empty vector.
pub fn parse_list_page(document: &Html, source_url: &str) -> Vec<ListItem> {
    let base = Url::parse(source_url).ok();
    let fallback_category = detect_category_from_url(source_url);

    let rows = ROW_CHAIN.all_in(document);
    debug!(rows = rows.len(), source_url, "list rows located");

    let items: Vec<ListItem> = rows
        .into_iter()
        .filter_map(|row| parse_row(row, base.as_ref(), fallback_category))
        .collect();

    debug!(items = items.len(), source_url, "list page parsed");
    items
}

/// Parse raw list-page markup
pub fn parse_list_html(html: &str, source_url: &str) -> Vec<ListItem> {
    let document = Html::parse_document(html);
    parse_list_page(&document, source_url)
}

fn parse_row(
    row: ElementRef,
    base: Option<&Url>,
    fallback_category: Option<&'static str>,
) -> Option<ListItem> {
    let link = LINK_CHAIN.first(row);

    let url = link
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_href(href, base));

    let title = non_empty_text(link);

    let (url, title) = match (url, title) {
        (Some(url), Some(title)) => (url, title),
        _ => {
            debug!("dropping row without url or title");
            return None;
        }
    };

    let id = row
        .value()
        .attr("data-pid")
        .or_else(|| row.value().attr("data-id"))
        .map(String::from)
        .or_else(|| id_from_url(&url));

    let datetime = TIME_CHAIN.first(row).and_then(|el| {
        el.value()
            .attr("datetime")
            .map(String::from)
            .or_else(|| non_empty_text(Some(el)))
    });

    // Placeholder price cells carry no digits
    let price = non_empty_text(PRICE_CHAIN.first(row))
        .filter(|p| p.chars().any(|c| c.is_ascii_digit()));

    let location = non_empty_text(HOOD_CHAIN.first(row))
        .map(|hood| strip_parens(&hood).trim().to_string())
        .filter(|hood| !hood.is_empty());

    let category = CATEGORY_CHAIN
        .first(row)
        .and_then(|el| el.value().attr("data-cat"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .or_else(|| fallback_category.map(String::from));

    let phone_numbers = non_empty_text(SNIPPET_CHAIN.first(row))
        .map(|snippet| find_phone_numbers(&snippet))
        .unwrap_or_default();

    Some(ListItem {
        id,
        url: Some(url),
        title: Some(title),
        datetime,
        location,
        price,
        category,
        phone_numbers,
        ..ListItem::default()
    })
}

/// Relative hrefs are joined onto the page URL; absolute ones are kept verbatim
fn resolve_href(href: &str, base: Option<&Url>) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROWS: &str = r#"
    <html><body>
      <ul class="rows">
        <li class="result-row" data-pid="111">
          <a class="result-title" href="https://example.org/nyc/apa/111.html">Sunny studio</a>
          <time datetime="2024-01-01T12:00:00-0500"></time>
          <span class="result-price">$1800</span>
          <span class="result-hood">(Upper East Side)</span>
        </li>
        <li class="result-row" data-pid="222">
          <a class="result-title" href="https://example.org/nyc/ggg/222.html">Weekend movers</a>
          <time datetime="2024-03-05T09:30:00-0500"></time>
          <span class="result-price">$25/hr</span>
          <span class="result-hood">(Queens)</span>
          <p class="result-description">Call 646-744-6519 or 646.744.6519</p>
        </li>
      </ul>
    </body></html>
    "#;

    #[test]
    fn test_parse_rows_in_document_order() {
        let items = parse_list_html(TWO_ROWS, "https://example.org/search/apa");
        assert_eq!(items.len(), 2);

        let a = &items[0];
        assert_eq!(a.id.as_deref(), Some("111"));
        assert_eq!(a.title.as_deref(), Some("Sunny studio"));
        assert_eq!(a.datetime.as_deref(), Some("2024-01-01T12:00:00-0500"));
        assert_eq!(a.price.as_deref(), Some("$1800"));
        assert_eq!(a.location.as_deref(), Some("Upper East Side"));
        assert_eq!(a.label, "post");
        assert!(a.phone_numbers.is_empty());

        let b = &items[1];
        assert_eq!(b.id.as_deref(), Some("222"));
        assert_eq!(b.location.as_deref(), Some("Queens"));
        assert_eq!(b.phone_numbers, vec!["646-744-6519", "646.744.6519"]);
    }

    #[test]
    fn test_rows_without_url_or_title_are_dropped() {
        let html = r#"
        <ul>
          <li class="result-row"><a class="result-title">No link</a></li>
          <li class="result-row"><a class="result-title" href="/nyc/apa/9.html">  </a></li>
          <li class="result-row"><span>nothing here</span></li>
          <li class="result-row"><a href="/nyc/apa/7654321.html">Kept</a></li>
        </ul>
        "#;

        let items = parse_list_html(html, "https://newyork.craigslist.org/search/apa");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Kept"));
        assert_eq!(
            items[0].url.as_deref(),
            Some("https://newyork.craigslist.org/nyc/apa/7654321.html")
        );
        assert_eq!(items[0].id.as_deref(), Some("7654321"));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_list_html("", "https://example.org/search/apa").is_empty());
        assert!(parse_list_html("<html><body><p>hi</p></body></html>", "").is_empty());
    }

    #[test]
    fn test_newer_markup_generation() {
        let html = r#"
        <ol>
          <li class="cl-search-result" data-id="500">
            <a class="cl-app-anchor" href="https://example.org/brk/roo/500.html">Room in Bushwick</a>
            <span class="result-date">Mar 5</span>
            <span class="price">free</span>
            <span class="nearby">(Brooklyn)</span>
          </li>
        </ol>
        "#;

        let items = parse_list_html(html, "https://example.org/search/roo");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id.as_deref(), Some("500"));
        assert_eq!(item.datetime.as_deref(), Some("Mar 5"));
        assert_eq!(item.price, None);
        assert_eq!(item.location.as_deref(), Some("Brooklyn"));
        assert_eq!(item.category.as_deref(), Some("housing"));
    }

    #[test]
    fn test_markup_category_wins_over_url() {
        let html = r#"
        <ul>
          <li class="result-row">
            <a class="result-title" href="https://example.org/nyc/sys/1.html">Laptop</a>
            <span class="category" data-cat="computers"></span>
          </li>
          <li class="result-row">
            <a class="result-title" href="https://example.org/nyc/sys/2.html">Desk</a>
          </li>
        </ul>
        "#;

        let items = parse_list_html(html, "https://example.org/search/sss");
        assert_eq!(items[0].category.as_deref(), Some("computers"));
        assert_eq!(items[1].category.as_deref(), Some("for sale"));
    }

    #[test]
    fn test_category_read_from_first_matched_element_only() {
        let html = r#"
        <ul>
          <li class="result-row">
            <a class="result-title" href="https://example.org/nyc/sys/1.html">Laptop</a>
            <span class="category">computers</span>
            <span data-cat="electronics"></span>
          </li>
        </ul>
        "#;

        let items = parse_list_html(html, "https://example.org/search/sss");
        assert_eq!(items[0].category.as_deref(), Some("for sale"));
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://x.org/mnh/fbh/333444555.html").as_deref(), Some("333444555"));
        assert_eq!(id_from_url("https://x.org/mnh/fbh/"), None);
    }
}
