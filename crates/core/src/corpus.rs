//! The site corpus: crawled page text keyed by URL.
//!
//! A `SiteCorpus` is built exactly once, after the crawl completes, and is
//! then shared read-only (behind an `Arc`) by every request. Anything that
//! needs a trimmed view takes a private copy with [`SiteCorpus::to_page_map`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A mutable `url → text` mapping, ordered by URL.
///
/// Ordered keys keep serialization, size accounting and provenance lists
/// reproducible for a given snapshot.
pub type PageMap = BTreeMap<String, String>;

/// A single crawled page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub url: String,
    pub text: String,
}

impl CorpusEntry {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Immutable snapshot of a site's pages.
#[derive(Debug, Clone)]
pub struct SiteCorpus {
    site: String,
    pages: PageMap,
    crawled_at: DateTime<Utc>,
}

impl SiteCorpus {
    pub fn new(site: impl Into<String>, pages: PageMap) -> Self {
        Self {
            site: site.into(),
            pages,
            crawled_at: Utc::now(),
        }
    }

    /// Build a corpus from individual entries. A repeated URL keeps the last text seen.
    pub fn from_entries(site: impl Into<String>, entries: impl IntoIterator<Item = CorpusEntry>) -> Self {
        let pages = entries.into_iter().map(|e| (e.url, e.text)).collect();
        Self::new(site, pages)
    }

    /// The site identifier (base URL) this corpus was crawled from.
    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn pages(&self) -> &PageMap {
        &self.pages
    }

    pub fn crawled_at(&self) -> DateTime<Utc> {
        self.crawled_at
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.pages.get(url).map(String::as_str)
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = CorpusEntry> + '_ {
        self.pages
            .iter()
            .map(|(url, text)| CorpusEntry::new(url.clone(), text.clone()))
    }

    /// A private, owned copy of the pages.
    pub fn to_page_map(&self) -> PageMap {
        self.pages.clone()
    }

    /// Total characters of page text (excluding URLs and serialization overhead).
    pub fn text_chars(&self) -> usize {
        self.pages.values().map(|t| t.chars().count()).sum()
    }
}
