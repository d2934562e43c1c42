//! Command-line driver for the retranslate guard.
//!
//! Usage:
//!   retranslate-guard fingerprint <text>     # Print the fingerprint of <text> (stdin if omitted)
//!   retranslate-guard set-language <lang>    # Persist and apply a language
//!   retranslate-guard check <file>           # Page-load recheck over the text in <file>
//!   retranslate-guard status                 # Show the persisted state
//!   retranslate-guard languages              # List the bundled display languages
//!
//! Optional environment variables:
//! - RECHECK_DELAY_MS (defaults to 1000)
//! - GUARD_STATE_FILE (defaults to data/guard_state.json)
//! - GUARD_LEGACY_CODES (defaults to false)

use anyhow::{bail, Context, Result};
use retranslate_guard::config::Config;
use retranslate_guard::i18n::{LanguageRegistry, LocaleMappingEngine};
use retranslate_guard::store::{LANGUAGE_PREFERENCE, LAST_CONTENT_FINGERPRINT};
use retranslate_guard::{
    fingerprint, FileStore, KeyValueStore, RecheckOutcome, RetranslateGuard, StaticText,
    TextSource, TranslationEngine,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Engine for the CLI: there is no UI to translate, so it only reports the switch.
struct LoggingEngine;

impl TranslationEngine for LoggingEngine {
    fn change_language(&self, lang: &str) -> Result<()> {
        info!("Translation engine switched to '{}'", lang);
        Ok(())
    }
}

/// Reads the page text from a file on every call.
struct FileText(PathBuf);

impl TextSource for FileText {
    fn visible_text(&self) -> Result<String> {
        std::fs::read_to_string(&self.0)
            .with_context(|| format!("Failed to read page text from {}", self.0.display()))
    }
}

fn build_guard(config: &Config, text: Arc<dyn TextSource>) -> RetranslateGuard {
    let store = Arc::new(FileStore::new(&config.state_file));
    let engine: Arc<dyn TranslationEngine> = if config.legacy_codes {
        Arc::new(LocaleMappingEngine::new(LoggingEngine))
    } else {
        Arc::new(LoggingEngine)
    };
    RetranslateGuard::from_config(config, store, engine, text)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("retranslate_guard=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("fingerprint") => {
            let text = match args.get(1) {
                Some(text) => text.clone(),
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read text from stdin")?;
                    buf
                }
            };
            println!("{}", fingerprint(&text));
        }
        Some("set-language") => {
            let lang = args.get(1).context("Usage: set-language <lang>")?;
            let registry = LanguageRegistry::get();
            if !registry.is_enabled(lang) && registry.get_by_legacy_code(lang).is_none() {
                warn!("'{}' is not a bundled language; the engine receives it as-is", lang);
            }
            let guard = build_guard(&config, Arc::new(StaticText::default()));
            guard.set_language(lang);
            info!("Language preference saved to {}", config.state_file.display());
        }
        Some("check") => {
            let path = args.get(1).context("Usage: check <file>")?;
            let guard = build_guard(&config, Arc::new(FileText(PathBuf::from(path))));

            match guard.maybe_retranslate() {
                None => info!("No language preference stored; nothing to re-apply"),
                Some(handle) => {
                    let outcome = handle.await.context("Recheck task failed")?;
                    match outcome {
                        RecheckOutcome::Retranslated {
                            language,
                            fingerprint,
                        } => info!("Re-applied '{}', recorded fingerprint {}", language, fingerprint),
                        other => info!("Recheck finished: {:?}", other),
                    }
                }
            }

            let report = serde_json::to_string_pretty(&guard.metrics().report())?;
            println!("{}", report);
        }
        Some("status") => {
            let store = FileStore::new(&config.state_file);
            let stored = store.get(LANGUAGE_PREFERENCE)?;
            let last = store.get(LAST_CONTENT_FINGERPRINT)?;
            let guard = build_guard(&config, Arc::new(StaticText::default()));

            println!("state file:       {}", config.state_file.display());
            println!("stored language:  {}", stored.as_deref().unwrap_or("(none)"));
            if let Some(language) = guard.current_language() {
                println!(
                    "resolves to:      {} ({}, legacy '{}')",
                    language.code(),
                    language.native_name(),
                    language.legacy_code()
                );
            }
            println!("last fingerprint: {}", last.as_deref().unwrap_or("(none)"));
        }
        Some("languages") => {
            for language in LanguageRegistry::get().list_enabled() {
                let marker = if language.is_default { " (default)" } else { "" };
                println!(
                    "{:<6} {:<20} {:<22} {}{}",
                    language.code, language.legacy_code, language.name, language.native_name, marker
                );
            }
        }
        Some(other) => bail!("Unknown command: {}", other),
        None => bail!("Usage: retranslate-guard <fingerprint|set-language|check|status|languages> [arg]"),
    }

    Ok(())
}
