//! Command-line client creating short links on a running server.
//!
//! ```bash
//! SHORTEN_TOKEN=my-secret cargo run --bin shorten -- \
//!     --endpoint https://s.example.com/new --ttl 12h https://example.com/long/path
//! ```

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::Parser;
use colored::*;

use ephemeral_shortener::client::ShortenClient;
use ephemeral_shortener::utils::duration::parse_duration;

/// Create a short link for a URL.
#[derive(Parser, Debug)]
#[command(name = "shorten")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Secret token accepted by the server
    #[arg(long, env = "SHORTEN_TOKEN", hide_env_values = true)]
    token: String,

    /// Link creation endpoint
    #[arg(long, default_value = "https://localhost:3000/new")]
    endpoint: String,

    /// Accept self-signed certificates
    #[arg(long)]
    insecure: bool,

    /// Lifetime of the link, e.g. `90s`, `30m`, `12h`
    #[arg(long, default_value = "12h", value_parser = parse_ttl)]
    ttl: TimeDelta,

    /// URL to shorten
    url: String,
}

fn parse_ttl(raw: &str) -> Result<TimeDelta, String> {
    parse_duration(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = if cli.insecure {
        ShortenClient::insecure(&cli.endpoint, cli.token)
    } else {
        ShortenClient::new(&cli.endpoint, cli.token)
    }
    .context("Failed to build client")?;

    let short = client
        .shorten(&cli.url, cli.ttl)
        .await
        .with_context(|| format!("Failed to shorten {}", cli.url))?;

    println!(
        "Short URL: {}\t(valid until {})",
        short.short_url.as_str().green().bold(),
        short.expires.format("%b %d %H:%M %Z")
    );

    Ok(())
}
