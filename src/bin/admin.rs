//! CLI administration tool for ephemeral-shortener.
//!
//! # Usage
//!
//! ```bash
//! # Generate a new secret token and its digest
//! cargo run --bin admin -- token generate
//!
//! # Print the digest of an existing token (value for TOKEN_SHA256)
//! cargo run --bin admin -- token hash "my-secret"
//!
//! # Validate the environment configuration
//! cargo run --bin admin -- config check
//! ```

use ephemeral_shortener::application::services::AuthService;
use ephemeral_shortener::config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

/// CLI tool for managing ephemeral-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage the secret token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Configuration checks
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Generate a random token and print it with its digest
    Generate,

    /// Print the SHA-256 digest of a token
    Hash {
        /// Raw token value
        token: String,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate configuration from the environment
    Check,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action),
        Commands::Config { action } => handle_config_action(action),
    }
}

/// Dispatches token commands.
fn handle_token_action(action: TokenAction) -> Result<()> {
    match action {
        TokenAction::Generate => {
            let token = generate_token();
            let digest = AuthService::hash_token(&token);

            println!("{}", "Generated new token".green().bold());
            println!();
            println!("  Token:  {}", token.bright_yellow().bold());
            println!("  SHA256: {}", digest.cyan());
            println!();
            println!("{}", "Server configuration:".bright_white());
            println!("  TOKEN_SHA256={}", digest);
            println!();
            println!(
                "{}",
                "Keep the token secret; only the digest belongs on the server."
                    .red()
                    .bold()
            );
        }
        TokenAction::Hash { token } => {
            // plain output so it can be used in scripts
            println!("{}", AuthService::hash_token(&token));
        }
    }

    Ok(())
}

/// Dispatches configuration commands.
fn handle_config_action(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => match config::load_from_env() {
            Ok(config) => {
                println!("{}", "Configuration is valid".green().bold());
                println!("  Listen:         {}", config.listen_addr.cyan());
                println!("  Canonical host: {}", config.canonical_host.cyan());
                println!("  URL TTL:        {}s", config.url_ttl.num_seconds());
                println!("  Reaper:         every {}s", config.reaper_interval_seconds);
                Ok(())
            }
            Err(e) => {
                println!("{} {:#}", "Configuration is invalid:".red().bold(), e);
                Err(e)
            }
        },
    }
}

/// Generates a random 48-character alphanumeric token.
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_cli_parses_hash() {
        let cli = Cli::try_parse_from(["admin", "token", "hash", "secret"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Token {
                action: TokenAction::Hash { .. }
            }
        ));
    }
}
