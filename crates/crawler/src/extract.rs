//! HTML → text extraction and same-site link discovery.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Tags whose entire subtree carries no readable text.
const SKIP_TAGS: [&str; 6] = ["script", "style", "noscript", "svg", "template", "iframe"];

/// Path fragments that never lead to content pages.
const SKIP_PATHS: [&str; 22] = [
    "/wp-admin",
    "/wp-login",
    "/wp-content/uploads",
    "/login",
    "/logout",
    "/signin",
    "/signout",
    "/cdn-cgi/",
    "/feed",
    "/rss",
    ".pdf",
    ".jpg",
    ".jpeg",
    ".png",
    ".gif",
    ".svg",
    ".webp",
    ".css",
    ".js",
    ".xml",
    ".zip",
    ".mp4",
];

/// Extract readable text from an HTML document, skipping scripts and styles.
pub fn html_to_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    collapse_whitespace(&parts.join(" "))
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, parts);
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of whitespace into a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The document `<title>`, if any.
pub fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Same-host links found on a page, resolved against the page URL and normalized.
///
/// Returned in document order without duplicates.
pub fn extract_links(document: &Html, page_url: &Url, site: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = std::collections::HashSet::new();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .filter(|url| is_crawlable(url, site))
        .map(|url| normalize_url(&url))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// Whether a URL belongs to the site and may hold content.
pub fn is_crawlable(url: &Url, site: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str() == site.host_str()
        && url.port_or_known_default() == site.port_or_known_default()
        && !is_skip_path(url.path())
}

fn is_skip_path(path: &str) -> bool {
    let path = path.to_lowercase();
    SKIP_PATHS.iter().any(|pattern| path.contains(pattern))
}

/// Canonical form used as the corpus key: no query, no fragment, no trailing slash.
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    let path = normalized.path().trim_end_matches('/').to_string();
    normalized.set_path(if path.is_empty() { "/" } else { &path });
    normalized
}
