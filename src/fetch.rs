//! Blocking page fetcher
//!
//! Thin HTTP layer in front of the extractors. No retry, throttling or
//! session handling; callers own that policy.

use tracing::{info, warn};
use url::Url;

use crate::config::{FetchConfig, RESULTS_PER_PAGE};
use crate::error::{Error, Result};
use crate::extractors::{parse_list_html, parse_post_html};
use crate::record::{ListItem, PostRecord};

/// Search URL for a location subdomain, category code and zero-based page
pub fn search_url(location: &str, category: &str, page: u32) -> Result<Url> {
    let offset = page
        .checked_mul(RESULTS_PER_PAGE)
        .ok_or(Error::PageOutOfRange { page })?;
    let url = Url::parse(&format!(
        "https://{}.craigslist.org/search/{}?s={}",
        location.trim(),
        category.trim(),
        offset
    ))?;
    Ok(url)
}

pub struct Fetcher {
    agent: ureq::Agent,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .user_agent(config.user_agent.as_str())
            .http_status_as_error(false);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Some(ureq::Proxy::new(proxy)?));
        }

        Ok(Self {
            agent: ureq::Agent::new_with_config(builder.build()),
        })
    }

    /// GET `url` and return the body; non-2xx statuses are errors
    pub fn fetch_html(&self, url: &str) -> Result<String> {
        let resp = self.agent.get(url).call()?;

        let status = resp.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "non-success response");
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = resp.into_body().read_to_string()?;
        info!(url, bytes = html.len(), "fetched page");
        Ok(html)
    }

    /// Fetch and parse one search results page
    pub fn fetch_list_page(&self, location: &str, category: &str, page: u32) -> Result<Vec<ListItem>> {
        let url = search_url(location, category, page)?;
        let html = self.fetch_html(url.as_str())?;
        Ok(parse_list_html(&html, url.as_str()))
    }

    /// Fetch and parse one post page
    pub fn fetch_post_page(&self, url: &str) -> Result<PostRecord> {
        let html = self.fetch_html(url)?;
        Ok(parse_post_html(&html, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_offsets() {
        assert_eq!(
            search_url("newyork", "jjj", 0).unwrap().as_str(),
            "https://newyork.craigslist.org/search/jjj?s=0"
        );
        assert_eq!(
            search_url("sfbay", "apa", 2).unwrap().as_str(),
            "https://sfbay.craigslist.org/search/apa?s=240"
        );
    }

    #[test]
    fn test_search_url_rejects_bad_host() {
        assert!(matches!(
            search_url("new york", "jjj", 0),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_search_url_page_overflow() {
        assert!(matches!(
            search_url("newyork", "jjj", 40_000_000),
            Err(Error::PageOutOfRange { page: 40_000_000 })
        ));
        assert!(search_url("newyork", "jjj", u32::MAX / RESULTS_PER_PAGE).is_ok());
    }

    #[test]
    fn test_fetcher_builds_with_proxy() {
        let config = FetchConfig::default().with_proxy("http://127.0.0.1:8080");
        assert!(Fetcher::new(&config).is_ok());

        let config = FetchConfig::default().with_proxy("   ");
        assert!(config.proxy.is_none());
    }
}
