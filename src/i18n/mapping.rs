//! Legacy preference codes.
//!
//! Older clients persisted `chinese_simplified`, `chinese_traditional`,
//! `english`, or an empty string as the language preference. The translation
//! engine expects locale codes, so stored values are mapped on the way out.

use crate::collaborators::TranslationEngine;
use crate::i18n::LanguageRegistry;
use anyhow::Result;
use tracing::debug;

/// Map a stored preference to the locale code the engine understands.
///
/// Locale codes pass through unchanged; legacy identifiers are translated;
/// anything else (including the empty string) falls back to the default
/// locale.
pub fn map_language_code(stored: &str) -> &'static str {
    let registry = LanguageRegistry::get();

    if let Some(config) = registry.get_by_code(stored) {
        return config.code;
    }

    registry
        .get_by_legacy_code(stored)
        .map(|config| config.code)
        .unwrap_or_else(|| registry.default_language().code)
}

/// Map a locale code back to the legacy identifier older clients store.
///
/// Unknown codes map to the default language's legacy identifier.
pub fn reverse_map_language_code(code: &str) -> &'static str {
    let registry = LanguageRegistry::get();
    registry
        .get_by_code(code)
        .map(|config| config.legacy_code)
        .unwrap_or_else(|| registry.default_language().legacy_code)
}

/// Engine adapter that maps legacy preference codes before delegating.
///
/// Lets a host keep persisting legacy identifiers while the underlying engine
/// only ever sees locale codes.
#[derive(Debug, Clone)]
pub struct LocaleMappingEngine<E> {
    inner: E,
}

impl<E> LocaleMappingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: TranslationEngine> TranslationEngine for LocaleMappingEngine<E> {
    fn change_language(&self, lang: &str) -> Result<()> {
        let locale = map_language_code(lang);
        if locale != lang {
            debug!("Mapped stored language '{}' to locale '{}'", lang, locale);
        }
        self.inner.change_language(locale)
    }
}
