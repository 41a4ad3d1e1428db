use anyhow::{Context, Result};
use campaign_i18n::config::Config;
use campaign_i18n::i18n::{ChangeOutcome, ContentBindings, FilePreferenceStore, TranslationStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Usage: campaign-i18n [LANGUAGE] [KEY...]
///
/// Loads the configured translations, optionally switches language, and
/// prints the resolved text for each key.
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campaign_i18n=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let mut args = std::env::args().skip(1);
    let requested = args.next();
    let keys: Vec<String> = args.collect();

    let store = TranslationStore::create(
        config.store_settings(),
        config.registry()?,
        config.source(reqwest::Client::new()),
        Arc::new(FilePreferenceStore::new(&config.preference_file)),
        config.browser_locale.as_deref(),
    );

    let mut bindings = ContentBindings::new();
    for key in &keys {
        let key_label = key.clone();
        bindings.bind(key, move |text| println!("{} = {}", key_label, text));
    }

    store
        .initialize()
        .await
        .context("Failed to load translations")?;

    if let Some(code) = requested {
        match store.set_active_language(&code).await {
            Ok(ChangeOutcome::Unchanged) => info!("Language {} already active", code),
            Ok(_) => {}
            Err(e) => {
                warn!("Keeping {}: {}", store.active_language(), e);
                return Err(e).context("Language change failed");
            }
        }
    }

    if let Some(table) = store.active_table() {
        let applied = bindings.apply(&table);
        if applied < bindings.len() {
            warn!("{} of {} keys have no translation", bindings.len() - applied, bindings.len());
        }
    }

    let active = store.active_language();
    let others: Vec<String> = store
        .registry()
        .list_enabled()
        .iter()
        .map(|lang| lang.code.clone())
        .filter(|code| *code != active.as_str())
        .collect();
    let others: Vec<&str> = others.iter().map(String::as_str).collect();
    store.preload(&others).await;

    info!("Cache: {}", serde_json::to_string(&store.cache_stats())?);
    info!("Metrics: {}", serde_json::to_string(&store.metrics())?);

    store.dispose();
    Ok(())
}
