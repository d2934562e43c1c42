//! Content-fingerprint guard for re-applying a display language on page load.
//!
//! After a user picks a language, the host calls [`RetranslateGuard::set_language`].
//! On every later page load it calls [`RetranslateGuard::maybe_retranslate`], which
//! waits for rendering to settle, fingerprints the visible text, and only asks
//! the translation engine to run again when the text differs from what was
//! recorded after the last pass.
//!
//! ```rust
//! use retranslate_guard::{MemoryStore, RecheckOutcome, RetranslateGuard, StaticText};
//! use std::sync::Arc;
//!
//! let engine = |lang: &str| -> anyhow::Result<()> {
//!     println!("switching to {}", lang);
//!     Ok(())
//! };
//! let guard = RetranslateGuard::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(engine),
//!     Arc::new(StaticText::new("Articles")),
//! );
//!
//! guard.set_language("en");
//! assert!(matches!(guard.recheck_now(), RecheckOutcome::Retranslated { .. }));
//! assert_eq!(guard.recheck_now(), RecheckOutcome::Unchanged);
//! ```

pub mod collaborators;
pub mod config;
pub mod fingerprint;
pub mod guard;
pub mod i18n;
pub mod metrics;
pub mod store;

pub use collaborators::{StaticText, TextSource, TranslationEngine};
pub use fingerprint::{fingerprint, ContentFingerprint};
pub use guard::{RecheckOutcome, RetranslateGuard, RECHECK_DELAY_MS};
pub use metrics::{GuardMetrics, MetricsReport};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
