//! CLI command definitions and handlers

use clap::Subcommand;
use tracing::info;

use crate::core::config::TranslationConfig;
use crate::core::health::DEFAULT_PROBE_TEXT;
use crate::core::registry::ProviderRegistry;
use crate::utils::validate_language_code;

/// Commands for mt-providers
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered providers
    List,

    /// Check that a provider can translate
    Health {
        /// Provider name
        #[arg(short, long)]
        provider: String,

        /// Text used for the probe translation
        #[arg(long, default_value = DEFAULT_PROBE_TEXT)]
        text: String,
    },

    /// Translate texts with a provider
    Translate {
        /// Provider name
        #[arg(short, long)]
        provider: String,

        /// Source language code (e.g. en)
        #[arg(short, long)]
        source: String,

        /// Target language code (e.g. fr)
        #[arg(short, long)]
        target: String,

        /// Use the async interface
        #[arg(long = "async")]
        use_async: bool,

        /// Texts to translate
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

/// Handle provider listing
pub fn handle_list(registry: &ProviderRegistry) -> anyhow::Result<()> {
    let names = registry.list();
    if names.is_empty() {
        println!("No providers registered");
        return Ok(());
    }

    for name in names {
        let factory = registry.get(&name)?;
        let info = factory.info();
        println!(
            "{}\tasync={}\tregion={}\tmax_chunk={}",
            name, info.supports_async, info.requires_region, info.max_chunk_size
        );
    }
    Ok(())
}

/// Handle health check; returns whether the provider is healthy
pub async fn handle_health(
    registry: &ProviderRegistry,
    config: &TranslationConfig,
    provider: &str,
    text: &str,
) -> anyhow::Result<bool> {
    info!("Checking health of provider {}", provider);

    let healthy = registry.check_health(provider, config, text).await;
    println!("{}", if healthy { "healthy" } else { "unhealthy" });
    Ok(healthy)
}

/// Handle translation, printing the responses as JSON
pub async fn handle_translate(
    registry: &ProviderRegistry,
    config: TranslationConfig,
    provider: &str,
    source: &str,
    target: &str,
    texts: Vec<String>,
    use_async: bool,
) -> anyhow::Result<()> {
    for code in [source, target] {
        if !validate_language_code(code) {
            anyhow::bail!("Invalid language code: {}", code);
        }
    }

    let provider = registry.create(provider, config)?;
    info!(
        "Translating {} text(s) {} -> {} with {}",
        texts.len(),
        source,
        target,
        provider.name()
    );

    let responses = if use_async {
        provider.bulk_translate_async(&texts, source, target).await
    } else {
        let blocking = provider.clone();
        let (source, target) = (source.to_string(), target.to_string());
        tokio::task::spawn_blocking(move || blocking.bulk_translate(&texts, &source, &target))
            .await?
    };

    let failed = responses.iter().filter(|r| !r.is_success()).count();
    println!("{}", serde_json::to_string_pretty(&responses)?);

    if failed > 0 {
        info!("{} of {} translation(s) failed", failed, responses.len());
    }
    Ok(())
}
