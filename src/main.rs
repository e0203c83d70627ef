//! Main entry point for the mt-providers CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::warn;

use mt_providers::cli::commands::{self, Commands};
use mt_providers::logging::init_logging;
use mt_providers::{ProviderRegistry, TranslationConfig, ENTRY_POINT_GROUP};

/// mt-providers - Pluggable machine translation providers
#[derive(Parser, Debug)]
#[command(name = "mt-providers", version, about, long_about = None)]
struct Args {
    /// API key (optional, defaults to MT_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Provider region (defaults to MT_REGION env var)
    #[arg(long)]
    region: Option<String>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum requests per second per provider instance
    #[arg(long)]
    rate_limit: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    init_logging(if args.verbose {
        "mt_providers=debug"
    } else {
        "mt_providers=info"
    });

    // CLI args override file and environment values
    if let Some(api_key) = &args.api_key {
        std::env::set_var("MT_API_KEY", api_key);
    }
    if let Some(region) = &args.region {
        std::env::set_var("MT_REGION", region);
    }
    if let Some(rate_limit) = args.rate_limit {
        std::env::set_var("MT_RATE_LIMIT", rate_limit.to_string());
    }

    let registry = ProviderRegistry::global();
    if let Err(e) = registry.discover(ENTRY_POINT_GROUP, false) {
        warn!("Provider discovery failed: {}", e);
    }

    match args.command {
        Some(Commands::List) => {
            commands::handle_list(registry)?;
        }
        Some(Commands::Health { provider, text }) => {
            let config = TranslationConfig::load(args.config.as_deref())?;
            if !commands::handle_health(registry, &config, &provider, &text).await? {
                std::process::exit(1);
            }
        }
        Some(Commands::Translate {
            provider,
            source,
            target,
            use_async,
            texts,
        }) => {
            let config = TranslationConfig::load(args.config.as_deref())?;
            commands::handle_translate(
                registry, config, &provider, &source, &target, texts, use_async,
            )
            .await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
