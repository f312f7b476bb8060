//! Concurrent batch parsing
//!
//! Each page is parsed on the tokio blocking pool. A task owns its HTML and
//! builds its own document, so no state is shared between pages.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use crate::error::Result;
use crate::extractors::{parse_list_html, parse_post_html};
use crate::normalize::normalize;
use crate::record::Record;

/// Which extractor a page goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    List,
    Post,
}

/// Raw page waiting to be parsed
#[derive(Debug, Clone)]
pub struct Page {
    pub kind: PageKind,
    pub url: String,
    pub html: String,
}

impl Page {
    pub fn new(kind: PageKind, url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            html: html.into(),
        }
    }

    /// Parse and normalize: one record per list item, or one for a post page
    pub fn into_records(self) -> Vec<Record> {
        match self.kind {
            PageKind::List => parse_list_html(&self.html, &self.url)
                .into_iter()
                .map(|item| normalize(&item.into_record()))
                .collect(),
            PageKind::Post => vec![normalize(&parse_post_html(&self.html, &self.url).into_record())],
        }
    }
}

/// Parse `pages` with at most `limit` running at once.
///
/// Records come back grouped by page in input order; items of a list page
/// keep document order.
pub async fn parse_batch(pages: Vec<Page>, limit: usize) -> Result<Vec<Record>> {
    let page_count = pages.len();

    let per_page: Vec<Vec<Record>> = stream::iter(pages)
        .map(|page| tokio::task::spawn_blocking(move || page.into_records()))
        .buffered(limit.max(1))
        .try_collect()
        .await?;

    let records: Vec<Record> = per_page.into_iter().flatten().collect();
    info!(pages = page_count, records = records.len(), "batch parsed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"
    <ul class="rows">
      <li class="result-row" data-pid="1"><a class="result-title" href="/a/apa/1.html">First</a></li>
      <li class="result-row" data-pid="2"><a class="result-title" href="/a/apa/2.html">Second</a></li>
    </ul>
    "#;

    const POST: &str = r#"
    <h1 id="titletextonly">Room for rent</h1>
    <section id="postingbody">Sunny room, call 212-555-0199</section>
    "#;

    #[tokio::test]
    async fn test_parse_batch_keeps_page_and_item_order() {
        let pages = vec![
            Page::new(PageKind::Post, "https://example.org/brk/roo/7000001.html", POST),
            Page::new(PageKind::List, "https://example.org/search/apa", LIST),
            Page::new(PageKind::List, "https://example.org/search/apa", ""),
        ];

        let records = parse_batch(pages, 2).await.unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0]["id"], "7000001");
        assert_eq!(records[0]["category"], "housing");
        assert_eq!(records[0]["phoneNumbers"][0], "212-555-0199");

        assert_eq!(records[1]["title"], "First");
        assert_eq!(records[1]["url"], "https://example.org/a/apa/1.html");
        assert_eq!(records[2]["title"], "Second");

        let keys: Vec<&str> = records[1].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "url", "title", "category", "label"]);
    }

    #[tokio::test]
    async fn test_parse_batch_empty() {
        let records = parse_batch(Vec::new(), 0).await.unwrap();
        assert!(records.is_empty());
    }
}
