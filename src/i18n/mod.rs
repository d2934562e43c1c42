//! Display-language support shared by the guard's host.
//!
//! # Architecture
//!
//! - `registry`: the locales the front-end ships, with their legacy identifiers
//! - `language`: `Language`, a code validated against the registry
//! - `mapping`: legacy preference codes and the engine adapter that maps them
//!
//! # Example
//!
//! ```rust
//! use retranslate_guard::i18n::{map_language_code, Language};
//!
//! assert_eq!(map_language_code("english"), "en");
//! assert_eq!(Language::default_language().code(), "zh-CN");
//! assert_eq!(Language::from_preference("zh-TW").legacy_code(), "chinese_traditional");
//! ```

mod language;
mod mapping;
mod registry;

pub use language::Language;
pub use mapping::{map_language_code, reverse_map_language_code, LocaleMappingEngine};
pub use registry::{LanguageConfig, LanguageRegistry};
