//! Interfaces the guard consumes from its host.
//!
//! The host supplies the visible page text and the engine that swaps UI
//! strings. Both are plain traits with blanket impls for closures, so a host
//! can wire them up without defining new types.

use anyhow::Result;

/// Snapshot of the page's rendered text.
pub trait TextSource: Send + Sync {
    /// Full visible text content at call time.
    fn visible_text(&self) -> Result<String>;
}

impl<F> TextSource for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn visible_text(&self) -> Result<String> {
        self()
    }
}

/// The internationalization engine performing the actual string substitution.
///
/// Calls are assumed idempotent and are treated as fire-and-forget.
pub trait TranslationEngine: Send + Sync {
    fn change_language(&self, lang: &str) -> Result<()>;
}

impl<F> TranslationEngine for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn change_language(&self, lang: &str) -> Result<()> {
        self(lang)
    }
}

/// Text source returning a fixed string.
#[derive(Debug, Clone, Default)]
pub struct StaticText(pub String);

impl StaticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl TextSource for StaticText {
    fn visible_text(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Mutex;

    #[test]
    fn test_static_text() {
        let source = StaticText::new("Hello");
        assert_eq!(source.visible_text().unwrap(), "Hello");
    }

    #[test]
    fn test_closure_text_source() {
        let source = || -> Result<String> { Ok("from closure".to_string()) };
        assert_eq!(source.visible_text().unwrap(), "from closure");
    }

    #[test]
    fn test_closure_text_source_error() {
        let source = || -> Result<String> { bail!("document not ready") };
        assert!(source.visible_text().is_err());
    }

    #[test]
    fn test_closure_engine_receives_language() {
        let calls = Mutex::new(Vec::new());
        let engine = |lang: &str| -> Result<()> {
            calls.lock().unwrap().push(lang.to_string());
            Ok(())
        };

        engine.change_language("fr").unwrap();
        engine.change_language("de").unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["fr", "de"]);
    }
}
