use anyhow::{Context, Result};
use content_translations::config::Config;
use content_translations::store::{PgStore, TranslationStore};
use content_translations::{get_batch_stats, get_completeness, get_translation_status, ContentType};
use serde_json::json;
use tracing::info;

/// Print translation completeness for every content item as JSON lines.
///
/// Usage: `translation-report [posts|products|brokers]`
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_translations=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let registry = config.language_registry()?;

    let content_types = match std::env::args().nth(1) {
        Some(arg) => vec![arg.parse::<ContentType>()?],
        None => ContentType::ALL.to_vec(),
    };

    let store = PgStore::connect(config.database_url()?, config.database_max_connections).await?;
    store.ensure_schema().await?;

    info!(
        default_language = %registry.default_language(),
        required = ?config.required_languages,
        "Building translation report"
    );

    for content_type in content_types {
        let items = store
            .list_with_parent(content_type)
            .await
            .with_context(|| format!("Failed to load {}", content_type))?;
        info!(%content_type, items = items.len(), "Loaded content items");

        for item in &items {
            let line = json!({
                "content_type": content_type,
                "content_id": item.id,
                "completeness": get_completeness(&item.translations, &config.required_languages),
                "status": get_translation_status(&item.translations, &config.required_languages),
            });
            println!("{}", line);
        }

        let stats = get_batch_stats(&items, &registry.enabled_codes());
        println!(
            "{}",
            json!({
                "content_type": content_type,
                "batch": stats,
            })
        );
    }

    info!("✓ Translation report complete");
    Ok(())
}
