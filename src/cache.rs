//! Cached translation lists and the derived status views.
//!
//! Entries are keyed by `(content_type, content_id)` and expire after a TTL,
//! which bounds staleness when an invalidation signal is missed. Every
//! invalidation stamps its key with a fresh value of a monotonic generation;
//! a load that started before the stamp does not write its (possibly stale)
//! result back. Stamps of keys with no cached entry are pruned on eviction.

use crate::completeness::{get_completeness, TranslationCompleteness};
use crate::error::{StoreError, StoreResult};
use crate::i18n::TranslationMetrics;
use crate::model::{ContentKey, Translation};
use crate::retry::{with_retry_if, RetryConfig};
use crate::schema::ContentType;
use crate::status::{get_translation_status, TranslationStatus};
use crate::store::TranslationStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Receives a signal after every successful mutation of an item's translations.
pub trait InvalidationListener: Send + Sync {
    fn on_mutated(&self, content_type: ContentType, content_id: &str);
}

impl<F> InvalidationListener for F
where
    F: Fn(ContentType, &str) + Send + Sync,
{
    fn on_mutated(&self, content_type: ContentType, content_id: &str) {
        self(content_type, content_id)
    }
}

struct CacheEntry {
    translations: Vec<Translation>,
    loaded_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<ContentKey, CacheEntry>,
    versions: HashMap<ContentKey, u64>,
    generation: u64,
}

/// TTL cache of translation lists.
pub struct TranslationCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl TranslationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh cached translations for a key, if any.
    pub fn get(&self, key: &ContentKey) -> Option<Vec<Translation>> {
        let state = self.state();
        state
            .entries
            .get(key)
            .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| entry.translations.clone())
    }

    /// Current version of a key; take it before loading from the store.
    pub fn version(&self, key: &ContentKey) -> u64 {
        self.state().versions.get(key).copied().unwrap_or(0)
    }

    /// Store a loaded list unless the key was invalidated since `version` was read.
    pub fn put_if_current(
        &self,
        key: ContentKey,
        version: u64,
        translations: Vec<Translation>,
    ) -> bool {
        let mut state = self.state();
        if state.versions.get(&key).copied().unwrap_or(0) != version {
            debug!(
                content_type = %key.content_type,
                content_id = %key.content_id,
                "Discarding translations loaded before invalidation"
            );
            return false;
        }
        state.entries.insert(
            key,
            CacheEntry {
                translations,
                loaded_at: Instant::now(),
            },
        );
        true
    }

    pub fn invalidate(&self, content_type: ContentType, content_id: &str) {
        let key = ContentKey::new(content_type, content_id);
        let mut state = self.state();
        state.entries.remove(&key);
        state.generation += 1;
        let generation = state.generation;
        state.versions.insert(key, generation);
        debug!(%content_type, content_id, "Invalidated cached translations");
    }

    /// Drop every expired entry. Returns how many were removed.
    ///
    /// Versions of keys left without an entry are forgotten too. A load still
    /// in flight for such a key then sees a mismatch and is not stored.
    pub fn evict_stale(&self) -> usize {
        let ttl = self.ttl;
        let mut guard = self.state();
        let state = &mut *guard;
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.loaded_at.elapsed() < ttl);
        let entries = &state.entries;
        state.versions.retain(|key, _| entries.contains_key(key));
        before - state.entries.len()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl InvalidationListener for TranslationCache {
    fn on_mutated(&self, content_type: ContentType, content_id: &str) {
        self.invalidate(content_type, content_id);
    }
}

/// Read-through access to translation lists and their derived views.
pub struct CachedTranslations {
    store: Arc<dyn TranslationStore>,
    cache: Arc<TranslationCache>,
    retry: RetryConfig,
}

impl CachedTranslations {
    pub fn new(store: Arc<dyn TranslationStore>, cache: Arc<TranslationCache>) -> Self {
        Self {
            store,
            cache,
            retry: RetryConfig::store_read(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    /// All translations of an item, from the cache when fresh.
    pub async fn translations(
        &self,
        content_type: ContentType,
        content_id: &str,
    ) -> StoreResult<Vec<Translation>> {
        let metrics = TranslationMetrics::global();
        let key = ContentKey::new(content_type, content_id);

        if let Some(translations) = self.cache.get(&key) {
            metrics.record_cache_hit();
            debug!(%content_type, content_id, "Translation cache hit");
            return Ok(translations);
        }

        metrics.record_cache_miss();
        debug!(%content_type, content_id, "Translation cache miss");

        let version = self.cache.version(&key);
        metrics.record_store_call();
        let translations = with_retry_if(
            &self.retry,
            "Load translations",
            || self.store.list(content_type, content_id, None),
            StoreError::is_transient,
        )
        .await
        .inspect_err(|_| metrics.record_store_failure())?;

        self.cache.put_if_current(key, version, translations.clone());
        Ok(translations)
    }

    pub async fn status<S: AsRef<str>>(
        &self,
        content_type: ContentType,
        content_id: &str,
        required_languages: &[S],
    ) -> StoreResult<Vec<TranslationStatus>> {
        let translations = self.translations(content_type, content_id).await?;
        Ok(get_translation_status(&translations, required_languages))
    }

    pub async fn completeness<S: AsRef<str>>(
        &self,
        content_type: ContentType,
        content_id: &str,
        required_languages: &[S],
    ) -> StoreResult<TranslationCompleteness> {
        let translations = self.translations(content_type, content_id).await?;
        Ok(get_completeness(&translations, required_languages))
    }
}
