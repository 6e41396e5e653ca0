//! SiteSage CLI: the main entry point.
//!
//! Commands:
//! - `init`: write a default config file
//! - `serve`: crawl the site, then start the HTTP API
//! - `crawl`: crawl the site and print the corpus as JSON
//! - `ask`: crawl the site and answer one question
//! - `status`: show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "sitesage",
    about = "SiteSage: ask questions about a website",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file to ~/.sitesage/config.toml
    Init,

    /// Crawl the site and start the HTTP API
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Site to crawl (overrides config and environment)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Crawl the site and print the corpus as JSON
    Crawl {
        /// Site to crawl (overrides config and environment)
        #[arg(long)]
        base_url: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Crawl the site and answer a single question
    Ask {
        /// The question, at most 500 characters
        question: String,

        /// Site to crawl (overrides config and environment)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port, base_url } => commands::serve::run(port, base_url).await?,
        Commands::Crawl { base_url, pretty } => commands::crawl::run(base_url, pretty).await?,
        Commands::Ask { question, base_url } => commands::ask::run(question, base_url).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
