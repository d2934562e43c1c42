//! Translation re-application guard.
//!
//! Decides, on page load, whether the stored language has to be re-applied to
//! the visible content. Instead of tracking every mutation, the guard compares
//! a fingerprint of the current text against the one recorded after the last
//! completed pass and only calls the engine when they differ.
//!
//! The recheck runs on a one-shot timer so late rendering can settle first.
//! Every `maybe_retranslate` and `set_language` call bumps a generation
//! counter; a pending recheck whose generation is no longer current resolves
//! to [`RecheckOutcome::Superseded`] without touching the engine or the store.
//!
//! Passes are serialized across clones: a `set_language` issued while a
//! recheck is reading the page or calling the engine waits for that recheck to
//! finish, so its language is always the last one applied. Collaborators must
//! not call back into the guard from `visible_text` or `change_language`.
//!
//! No failure here is surfaced to the caller. Store errors fail open (treated
//! as "content changed"), text errors degrade to the empty-string fingerprint,
//! and engine errors are logged and counted.

use crate::collaborators::{TextSource, TranslationEngine};
use crate::config::Config;
use crate::fingerprint::ContentFingerprint;
use crate::i18n::Language;
use crate::metrics::GuardMetrics;
use crate::store::{KeyValueStore, LANGUAGE_PREFERENCE, LAST_CONTENT_FINGERPRINT};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default delay before the page-load recheck reads the content.
pub const RECHECK_DELAY_MS: u64 = 1000;

/// How a recheck ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecheckOutcome {
    /// No language was ever selected; nothing to re-apply
    NoPreference,

    /// A newer `maybe_retranslate` or `set_language` call took over
    Superseded,

    /// Content matches the recorded fingerprint; engine not called
    Unchanged,

    /// Engine called and the post-translation fingerprint recorded
    Retranslated {
        language: String,
        fingerprint: ContentFingerprint,
    },

    /// Engine returned an error; the fingerprint was left as it was
    EngineFailed { language: String },
}

/// The guard. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RetranslateGuard {
    store: Arc<dyn KeyValueStore>,
    engine: Arc<dyn TranslationEngine>,
    text: Arc<dyn TextSource>,
    recheck_delay: Duration,
    generation: Arc<AtomicU64>,
    pass: Arc<Mutex<()>>,
    metrics: Arc<GuardMetrics>,
}

impl RetranslateGuard {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        engine: Arc<dyn TranslationEngine>,
        text: Arc<dyn TextSource>,
    ) -> Self {
        Self {
            store,
            engine,
            text,
            recheck_delay: Duration::from_millis(RECHECK_DELAY_MS),
            generation: Arc::new(AtomicU64::new(0)),
            pass: Arc::new(Mutex::new(())),
            metrics: Arc::new(GuardMetrics::new()),
        }
    }

    /// Build a guard using the delay from `config`.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        engine: Arc<dyn TranslationEngine>,
        text: Arc<dyn TextSource>,
    ) -> Self {
        Self::new(store, engine, text).with_recheck_delay(config.recheck_delay)
    }

    pub fn with_recheck_delay(mut self, delay: Duration) -> Self {
        self.recheck_delay = delay;
        self
    }

    pub fn recheck_delay(&self) -> Duration {
        self.recheck_delay
    }

    pub fn metrics(&self) -> &GuardMetrics {
        &self.metrics
    }

    /// The stored preference resolved against the bundled locales, or `None`
    /// when no language was ever selected. Legacy identifiers and unknown
    /// values resolve the way the front-end resolves them.
    pub fn current_language(&self) -> Option<Language> {
        self.language_preference()
            .map(|stored| Language::from_preference(&stored))
    }

    /// Explicit user switch: persist `lang` and apply it, with no fingerprint
    /// gating. Invalidates any pending recheck.
    pub fn set_language(&self, lang: &str) {
        let _pass = self.lock_pass();
        let generation = self.next_generation();
        info!("Switching display language to '{}' (generation {})", lang, generation);

        if let Err(e) = self.store.set(LANGUAGE_PREFERENCE, lang) {
            warn!("Failed to persist language preference '{}': {}", lang, e);
            self.metrics.record_store_failure();
        }

        self.apply_language(lang);
    }

    /// Page-load entry point.
    ///
    /// Returns `None` when no language preference is stored. Otherwise spawns
    /// the delayed recheck and returns its handle; dropping the handle leaves
    /// the recheck running.
    ///
    /// Called outside a Tokio runtime, the recheck goes to a small background
    /// runtime owned by this module. If that cannot be started either, the
    /// recheck is skipped and `None` is returned.
    pub fn maybe_retranslate(&self) -> Option<JoinHandle<RecheckOutcome>> {
        let (language, generation) = {
            let _pass = self.lock_pass();
            match self.language_preference() {
                Some(language) => (language, self.next_generation()),
                None => {
                    debug!("No language preference stored, leaving default rendering");
                    return None;
                }
            }
        };

        let delay = self.recheck_delay;
        let guard = self.clone();

        debug!(
            "Scheduling content recheck for '{}' in {:?} (generation {})",
            language, delay, generation
        );

        let task = async move {
            tokio::time::sleep(delay).await;
            guard.recheck(generation, &language)
        };

        match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(task)),
            Err(_) => {
                warn!("No Tokio runtime on this thread, scheduling recheck on the fallback runtime");
                match fallback_runtime() {
                    Some(runtime) => Some(runtime.spawn(task)),
                    None => {
                        warn!("Fallback runtime unavailable, skipping recheck");
                        None
                    }
                }
            }
        }
    }

    /// Run the recheck immediately, for hosts that schedule it themselves.
    pub fn recheck_now(&self) -> RecheckOutcome {
        let _pass = self.lock_pass();
        match self.language_preference() {
            Some(language) => {
                let generation = self.next_generation();
                self.recheck_locked(generation, &language)
            }
            None => RecheckOutcome::NoPreference,
        }
    }

    /// Whether the visible content differs from the last recorded fingerprint.
    ///
    /// True when no fingerprint was ever recorded or the store cannot be read.
    pub fn has_content_changed(&self) -> bool {
        let current = self.current_fingerprint().to_string();

        match self.store.get(LAST_CONTENT_FINGERPRINT) {
            Ok(Some(stored)) => stored != current,
            Ok(None) => true,
            Err(e) => {
                warn!("Cannot read stored fingerprint, assuming content changed: {}", e);
                self.metrics.record_store_failure();
                true
            }
        }
    }

    fn recheck(&self, generation: u64, language: &str) -> RecheckOutcome {
        let _pass = self.lock_pass();
        self.recheck_locked(generation, language)
    }

    /// Decide and apply one pass. The caller holds the pass lock, so the
    /// generation cannot move between the check below and the store write.
    fn recheck_locked(&self, generation: u64, language: &str) -> RecheckOutcome {
        if !self.is_current(generation) {
            debug!("Recheck generation {} superseded, skipping", generation);
            self.metrics.record_superseded();
            return RecheckOutcome::Superseded;
        }

        self.metrics.record_recheck();

        if !self.has_content_changed() {
            info!("Content unchanged since last translation pass, skipping");
            self.metrics.record_unchanged();
            return RecheckOutcome::Unchanged;
        }

        info!("Content changed, re-applying language '{}'", language);
        if !self.apply_language(language) {
            return RecheckOutcome::EngineFailed {
                language: language.to_string(),
            };
        }
        self.metrics.record_retranslation();

        let fingerprint = self.current_fingerprint();
        if let Err(e) = self
            .store
            .set(LAST_CONTENT_FINGERPRINT, &fingerprint.to_string())
        {
            warn!("Failed to persist content fingerprint: {}", e);
            self.metrics.record_store_failure();
        }

        RecheckOutcome::Retranslated {
            language: language.to_string(),
            fingerprint,
        }
    }

    fn apply_language(&self, language: &str) -> bool {
        match self.engine.change_language(language) {
            Ok(()) => true,
            Err(e) => {
                warn!("Translation engine failed for '{}': {}", language, e);
                self.metrics.record_engine_failure();
                false
            }
        }
    }

    fn current_fingerprint(&self) -> ContentFingerprint {
        let text = self.text.visible_text().unwrap_or_else(|e| {
            warn!("Cannot read visible text, fingerprinting empty content: {}", e);
            String::new()
        });
        ContentFingerprint::of(&text)
    }

    fn language_preference(&self) -> Option<String> {
        match self.store.get(LANGUAGE_PREFERENCE) {
            Ok(preference) => preference,
            Err(e) => {
                warn!("Cannot read language preference: {}", e);
                self.metrics.record_store_failure();
                None
            }
        }
    }

    fn lock_pass(&self) -> MutexGuard<'_, ()> {
        self.pass.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

fn fallback_runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();

    RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("retranslate-recheck")
                .enable_time()
                .build()
                .map_err(|e| warn!("Failed to start fallback runtime: {}", e))
                .ok()
        })
        .as_ref()
}
