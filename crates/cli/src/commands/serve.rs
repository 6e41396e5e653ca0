//! `sitesage serve`: Crawl the site, then start the HTTP API server.

pub async fn run(
    port_override: Option<u16>,
    base_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(base_url)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("SiteSage Gateway");
    println!("   Site:      {}", config.base_url()?);
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Budget:    {} chars", config.site.max_context_chars);

    sitesage_gateway::start(config).await?;

    Ok(())
}
