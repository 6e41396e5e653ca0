//! `sitesage crawl`: Crawl the site and print the corpus as JSON.

use sitesage_crawler::{CrawlOptions, HttpCrawler, SiteCrawler};
use tracing::info;

pub async fn run(base_url: Option<String>, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(base_url)?;
    let base_url = config.base_url()?;

    let crawler = HttpCrawler::new(CrawlOptions::from(&config.crawler))?;
    let corpus = crawler.crawl(&base_url).await?;
    info!(
        pages = corpus.len(),
        serialized_chars = sitesage_qa::serialized_size(corpus.pages()),
        "Crawl finished"
    );

    let json = if pretty {
        serde_json::to_string_pretty(corpus.pages())?
    } else {
        serde_json::to_string(corpus.pages())?
    };
    println!("{json}");

    Ok(())
}
