//! Language registry: single source of truth for the display languages the
//! front-end ships, including the legacy identifiers older clients persisted.
//!
//! Initialized once through `OnceLock` and immutable afterwards.

use std::sync::OnceLock;

/// Configuration for a supported display language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Locale code handed to the translation engine (e.g. "zh-CN", "en")
    pub code: &'static str,

    /// Identifier older clients stored as their preference (e.g. "english")
    pub legacy_code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Name of the language in its own script
    pub native_name: &'static str,

    /// Whether this is the fallback locale (exactly one should be true)
    pub is_default: bool,

    /// Whether this language is offered to users
    pub enabled: bool,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Global registry instance, built on first access.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by its locale code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Look up a language by the legacy identifier stored by older clients.
    pub fn get_by_legacy_code(&self, legacy: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.legacy_code == legacy)
    }

    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// The fallback locale used when a stored preference is empty or unknown.
    ///
    /// Falls back to the first registered language if none is flagged.
    pub fn default_language(&self) -> &LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_default)
            .unwrap_or(&self.languages[0])
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Locales bundled with the front-end. Simplified Chinese is the default.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "zh-CN",
            legacy_code: "chinese_simplified",
            name: "Chinese (Simplified)",
            native_name: "简体中文",
            is_default: true,
            enabled: true,
        },
        LanguageConfig {
            code: "zh-TW",
            legacy_code: "chinese_traditional",
            name: "Chinese (Traditional)",
            native_name: "繁體中文",
            is_default: false,
            enabled: true,
        },
        LanguageConfig {
            code: "en",
            legacy_code: "english",
            name: "English",
            native_name: "English",
            is_default: false,
            enabled: true,
        },
    ]
}
