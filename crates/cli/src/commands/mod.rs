pub mod ask;
pub mod crawl;
pub mod init;
pub mod serve;
pub mod status;

use sitesage_config::AppConfig;

/// Load the config and apply a `--base-url` override.
pub fn load_config(base_url: Option<String>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(base_url) = base_url {
        config.site.base_url = Some(base_url);
        config.validate()?;
    }

    Ok(config)
}
