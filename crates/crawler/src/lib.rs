//! Site crawler for SiteSage.
//!
//! Produces the `url → text` corpus once at startup. The question-answering
//! side only sees the [`SiteCrawler`] trait; [`HttpCrawler`] is the shipped
//! implementation (breadth-first, same host, bounded depth and page count).

pub mod extract;
pub mod http;

use async_trait::async_trait;
use sitesage_core::{CrawlError, SiteCorpus};
use std::time::Duration;
use url::Url;

pub use http::HttpCrawler;

/// Anything that can turn a site's base URL into a corpus.
#[async_trait]
pub trait SiteCrawler: Send + Sync {
    async fn crawl(&self, base_url: &Url) -> Result<SiteCorpus, CrawlError>;
}

/// Limits for a crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Link depth followed from the start page (0 = start page only).
    pub max_depth: u32,
    pub max_pages: usize,
    /// Concurrent fetches within one depth level.
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&sitesage_config::CrawlerConfig::default())
    }
}

impl From<&sitesage_config::CrawlerConfig> for CrawlOptions {
    fn from(config: &sitesage_config::CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_pages: config.max_pages.max(1),
            concurrency: config.concurrency.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}
