//! Breadth-first HTTP crawler.
//!
//! Uses reqwest for fetching and scraper for HTML parsing. No JavaScript
//! rendering: static HTML (and plain-text) pages only.

use async_trait::async_trait;
use futures::StreamExt;
use scraper::Html;
use sitesage_core::{CrawlError, PageMap, SiteCorpus};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::extract::{extract_links, extract_title, html_to_text, normalize_url};
use crate::{CrawlOptions, SiteCrawler};

/// Crawls a single site over HTTP.
pub struct HttpCrawler {
    client: reqwest::Client,
    options: CrawlOptions,
}

/// A fetched page body, before parsing.
struct Fetched {
    url: Url,
    body: String,
    is_html: bool,
}

/// Parsed page content plus the links it points to.
struct Page {
    text: String,
    links: Vec<Url>,
}

impl HttpCrawler {
    /// Build a crawler. Zero `concurrency` or `max_pages` is raised to one.
    pub fn new(mut options: CrawlOptions) -> Result<Self, CrawlError> {
        options.concurrency = options.concurrency.max(1);
        options.max_pages = options.max_pages.max(1);

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| CrawlError::Client(e.to_string()))?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Fetch one URL. `Ok(None)` means the response holds no text worth keeping.
    async fn fetch(&self, url: Url) -> Result<Option<Fetched>, CrawlError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.5")
            .send()
            .await
            .map_err(|e| CrawlError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();

        let is_html = content_type.contains("html");
        if !is_html && !content_type.starts_with("text/") {
            debug!(url = %url, content_type = %content_type, "Skipping non-text resource");
            return Ok(None);
        }

        let body = response.text().await.map_err(|e| CrawlError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(Fetched { url, body, is_html }))
    }

    /// Turn a fetched body into text and outgoing links.
    fn parse(fetched: &Fetched, site: &Url, follow_links: bool) -> Page {
        if !fetched.is_html {
            return Page {
                text: fetched.body.trim().to_string(),
                links: Vec::new(),
            };
        }

        let document = Html::parse_document(&fetched.body);
        let body_text = html_to_text(&document);
        let text = match extract_title(&document) {
            Some(title) if !body_text.starts_with(&title) => format!("{title}\n{body_text}"),
            _ => body_text,
        };
        let links = if follow_links {
            extract_links(&document, &fetched.url, site)
        } else {
            Vec::new()
        };

        Page { text, links }
    }
}

#[async_trait]
impl SiteCrawler for HttpCrawler {
    async fn crawl(&self, base_url: &Url) -> Result<SiteCorpus, CrawlError> {
        let start = normalize_url(base_url);
        info!(
            url = %start,
            max_depth = self.options.max_depth,
            max_pages = self.options.max_pages,
            concurrency = self.options.concurrency,
            "Starting crawl"
        );

        let mut pages = PageMap::new();
        let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
        let mut current_level = vec![start.clone()];

        for depth in 0..=self.options.max_depth {
            if current_level.is_empty() || pages.len() >= self.options.max_pages {
                break;
            }

            let remaining = self.options.max_pages - pages.len();
            current_level.truncate(remaining);
            debug!(depth, urls = current_level.len(), pages = pages.len(), "Crawling level");

            // `buffered` keeps results in request order, so link discovery
            // (and therefore the crawl) is reproducible for a given site.
            let results: Vec<_> = futures::stream::iter(current_level.drain(..))
                .map(|url| self.fetch(url))
                .buffered(self.options.concurrency)
                .collect()
                .await;

            let follow_links = depth < self.options.max_depth;
            let mut next_level = Vec::new();

            for result in results {
                let fetched = match result {
                    Ok(Some(fetched)) => fetched,
                    Ok(None) => continue,
                    // The start page must be reachable; later pages are best effort.
                    Err(e) if depth == 0 => return Err(e),
                    Err(e) => {
                        warn!(error = %e, "Skipping page");
                        continue;
                    }
                };

                let page = Self::parse(&fetched, &start, follow_links);
                for link in page.links {
                    if visited.insert(link.to_string()) {
                        next_level.push(link);
                    }
                }

                if page.text.is_empty() {
                    debug!(url = %fetched.url, "Skipping page without text");
                    continue;
                }
                pages.insert(fetched.url.to_string(), page.text);
            }

            current_level = next_level;
        }

        if pages.is_empty() {
            return Err(CrawlError::EmptySite(start.to_string()));
        }

        info!(url = %start, pages = pages.len(), "Crawl complete");
        Ok(SiteCorpus::new(base_url.as_str(), pages))
    }
}
