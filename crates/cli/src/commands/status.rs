//! `sitesage status`: Show the effective configuration.

use sitesage_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("SiteSage Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    match config.base_url() {
        Ok(url) => println!("  Site:         {url}"),
        Err(e) => println!("  Site:         ({e})"),
    }
    println!("  Budget:       {} chars", config.site.max_context_chars);
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", sitesage_providers::model_for(&config));
    match config.default_temperature {
        Some(t) => println!("  Temperature:  {t}"),
        None => println!("  Temperature:  (provider default)"),
    }
    println!("  API key:      {}", if config.has_api_key() { "set" } else { "missing" });
    println!(
        "  Crawler:      depth {}, max {} pages, {} concurrent",
        config.crawler.max_depth, config.crawler.max_pages, config.crawler.concurrency
    );
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file. Run `sitesage init` to create one");
    }

    Ok(())
}
