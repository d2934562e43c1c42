//! Language type: a display language validated against the registry.

use crate::i18n::{map_language_code, reverse_map_language_code, LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// A validated, enabled display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Locale code from the registry (e.g. "zh-CN", "en")
    code: &'static str,
}

impl Language {
    /// Create a Language from a locale code.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered and enabled
    /// * `Err` if the code is unknown or disabled
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Resolve a stored preference, in locale or legacy form.
    ///
    /// Values that name no enabled language resolve to the default.
    pub fn from_preference(stored: &str) -> Language {
        Language::from_code(map_language_code(stored)).unwrap_or_else(|_| Language::default_language())
    }

    /// The fallback language.
    pub fn default_language() -> Language {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Identifier older clients would have stored for this language.
    pub fn legacy_code(&self) -> &'static str {
        reverse_map_language_code(self.code)
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }

    // A `Language` is only built from a registry entry; the default entry
    // stands in if the lookup misses.
    fn config(&self) -> &'static LanguageConfig {
        let registry = LanguageRegistry::get();
        registry
            .get_by_code(self.code)
            .unwrap_or_else(|| registry.default_language())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        let language = Language::from_code("zh-TW").expect("Should succeed");
        assert_eq!(language.code(), "zh-TW");
        assert_eq!(language.native_name(), "繁體中文");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_english_details() {
        let english = Language::from_code("en").unwrap();
        assert_eq!(english.name(), "English");
        assert_eq!(english.legacy_code(), "english");
        assert!(!english.is_default());
    }

    // ==================== from_preference Tests ====================

    #[test]
    fn test_from_preference_locale_and_legacy_forms_agree() {
        assert_eq!(
            Language::from_preference("chinese_traditional"),
            Language::from_preference("zh-TW")
        );
        assert_eq!(Language::from_preference("english").code(), "en");
    }

    #[test]
    fn test_from_preference_unknown_is_default() {
        assert_eq!(Language::from_preference("fr"), Language::default_language());
        assert_eq!(Language::from_preference(""), Language::default_language());
    }

    // ==================== Default Tests ====================

    #[test]
    fn test_default_language() {
        let default = Language::default_language();
        assert_eq!(default.code(), "zh-CN");
        assert_eq!(default.legacy_code(), "chinese_simplified");
        assert!(default.is_default());
        assert_eq!(default.native_name(), "简体中文");
    }
}
