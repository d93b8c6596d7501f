//! Translation lifecycle: validated create, update and delete.
//!
//! Every operation returns a [`MutationResult`] instead of an error. After a
//! successful mutation, registered [`InvalidationListener`]s are told which
//! `(content_type, content_id)` changed.

use crate::cache::InvalidationListener;
use crate::completeness::is_complete;
use crate::error::{StoreError, TranslationError};
use crate::i18n::{LanguageRegistry, TranslationMetrics, TranslationValidator};
use crate::model::{FieldPatch, FieldValues, Translation};
use crate::schema::ContentType;
use crate::store::TranslationStore;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Outcome of a lifecycle operation.
#[derive(Debug)]
pub struct MutationResult {
    pub success: bool,
    pub message: String,
    /// The translation as stored, for create and update
    pub translation: Option<Translation>,
    pub error: Option<TranslationError>,
    /// Non-blocking issues, such as a required field emptied by an update
    pub warnings: Vec<String>,
    /// Completeness of the stored translation, for create and update
    pub is_complete: Option<bool>,
}

impl MutationResult {
    fn succeeded(message: impl Into<String>, translation: Option<Translation>) -> Self {
        let is_complete = translation.as_ref().map(is_complete);
        Self {
            success: true,
            message: message.into(),
            translation,
            error: None,
            warnings: Vec::new(),
            is_complete,
        }
    }

    fn failed(message: impl Into<String>, error: TranslationError) -> Self {
        Self {
            success: false,
            message: message.into(),
            translation: None,
            error: Some(error),
            warnings: Vec::new(),
            is_complete: None,
        }
    }

    fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

type CreateKey = (ContentType, String, String);
type CreateLocks = Mutex<HashMap<CreateKey, Arc<tokio::sync::Mutex<()>>>>;

/// Forgets a per-key create lock on drop once no create holds it.
///
/// Declared before the lock handle so it drops after it, which also covers a
/// cancelled create future.
struct CreateLockRelease<'a> {
    locks: &'a CreateLocks,
    key: CreateKey,
}

impl Drop for CreateLockRelease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

/// Orchestrates writes against a translation store.
pub struct TranslationManager {
    store: Arc<dyn TranslationStore>,
    languages: Arc<LanguageRegistry>,
    listeners: Vec<Arc<dyn InvalidationListener>>,
    create_locks: CreateLocks,
}

impl TranslationManager {
    pub fn new(store: Arc<dyn TranslationStore>, languages: Arc<LanguageRegistry>) -> Self {
        Self {
            store,
            languages,
            listeners: Vec::new(),
            create_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn InvalidationListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    pub fn store(&self) -> &Arc<dyn TranslationStore> {
        &self.store
    }

    /// Create the translation of an item in one language.
    ///
    /// Fails with [`TranslationError::Duplicate`] when the language already
    /// has a translation. Creates for the same key are serialized.
    pub async fn create_translation(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: &str,
        fields: FieldValues,
    ) -> MutationResult {
        if let Err(rejected) = self.validate_new(content_type, content_id, language_code, &fields) {
            return rejected;
        }

        let key = (content_type, content_id.to_string(), language_code.to_string());
        let release = self.lock_release(key.clone());
        let lock = self.create_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            self.insert_new(content_type, content_id, language_code, &fields)
                .await
        };
        drop(lock);
        drop(release);

        match result {
            Ok(translation) => {
                self.mutated(content_type, content_id);
                info!(%content_type, content_id, language = language_code, "Translation created");
                MutationResult::succeeded("Translation created", Some(translation))
            }
            Err(err) => {
                warn!(%content_type, content_id, language = language_code, "Failed to create translation: {}", err);
                MutationResult::failed("Failed to create translation", err)
            }
        }
    }

    fn validate_new(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: &str,
        fields: &FieldValues,
    ) -> Result<(), MutationResult> {
        let report = TranslationValidator::validate_create(
            &self.languages,
            content_type,
            content_id,
            language_code,
            fields,
        );
        report.into_result().map(|_| ()).map_err(|err| {
            warn!(%content_type, content_id, language = language_code, "Rejected translation: {}", err);
            MutationResult::failed("Invalid translation", err)
        })
    }

    async fn insert_new(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: &str,
        fields: &FieldValues,
    ) -> Result<Translation, TranslationError> {
        let existing = self
            .store
            .list(content_type, content_id, Some(language_code))
            .await?;
        if !existing.is_empty() {
            return Err(TranslationError::Duplicate {
                content_id: content_id.to_string(),
                language_code: language_code.to_string(),
            });
        }

        let mut translation =
            Translation::blank(content_type, "", content_id, language_code, Utc::now());
        for (name, value) in fields {
            translation.set_field(name, Some(value.clone()));
        }

        Ok(self.store.insert(translation).await?)
    }

    /// Apply a partial update; fields absent from `patch` are left untouched.
    ///
    /// Emptying a required field is allowed. The result then carries a
    /// warning and `is_complete == Some(false)`.
    pub async fn update_translation(
        &self,
        content_type: ContentType,
        id: &str,
        patch: FieldPatch,
    ) -> MutationResult {
        let warnings = match TranslationValidator::validate_patch(content_type, &patch).into_result()
        {
            Ok(warnings) => warnings,
            Err(err) => {
                warn!(%content_type, id, "Rejected translation update: {}", err);
                return MutationResult::failed("Invalid translation update", err);
            }
        };

        match self.store.update(content_type, id, &patch).await {
            Ok(translation) => {
                self.mutated(content_type, translation.content_id());
                let result = MutationResult::succeeded("Translation updated", Some(translation))
                    .with_warnings(warnings);
                if result.is_complete == Some(false) {
                    warn!(%content_type, id, "Translation is incomplete after update");
                } else {
                    info!(%content_type, id, "Translation updated");
                }
                result
            }
            Err(err) => {
                warn!(%content_type, id, "Failed to update translation: {}", err);
                MutationResult::failed("Failed to update translation", err.into())
            }
        }
    }

    /// Delete a translation. Deleting one that does not exist succeeds.
    pub async fn delete_translation(&self, content_type: ContentType, id: &str) -> MutationResult {
        let existing = match self.store.get(content_type, id).await {
            Ok(Some(translation)) => translation,
            Ok(None) => return MutationResult::succeeded("Translation already deleted", None),
            Err(err) => {
                warn!(%content_type, id, "Failed to delete translation: {}", err);
                return MutationResult::failed("Failed to delete translation", err.into());
            }
        };

        match self.store.delete(content_type, id).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {
                self.mutated(content_type, existing.content_id());
                info!(%content_type, id, content_id = existing.content_id(), "Translation deleted");
                MutationResult::succeeded("Translation deleted", None)
            }
            Err(err) => {
                warn!(%content_type, id, "Failed to delete translation: {}", err);
                MutationResult::failed("Failed to delete translation", err.into())
            }
        }
    }

    /// Create the translation, or replace every field of an existing one.
    ///
    /// The input is validated as for a create in both cases.
    pub async fn upsert_translation(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: &str,
        fields: FieldValues,
    ) -> MutationResult {
        if let Err(rejected) = self.validate_new(content_type, content_id, language_code, &fields) {
            return rejected;
        }

        let existing = match self
            .store
            .list(content_type, content_id, Some(language_code))
            .await
        {
            Ok(existing) => existing,
            Err(err) => return MutationResult::failed("Failed to save translation", err.into()),
        };

        let Some(current) = existing.iter().max_by_key(|t| t.updated_at()) else {
            return self
                .create_translation(content_type, content_id, language_code, fields)
                .await;
        };

        let patch: FieldPatch = content_type
            .schema()
            .translatable_fields()
            .into_iter()
            .map(|field| (field.to_string(), fields.get(field).cloned()))
            .collect();
        self.update_translation(content_type, current.id(), patch)
            .await
    }

    /// Delete every translation of one item, optionally in one language only.
    pub(crate) async fn delete_for_content(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: Option<&str>,
    ) -> Result<u64, TranslationError> {
        if let Some(code) = language_code {
            self.languages.language(code)?;
        }

        let deleted = self
            .store
            .bulk_delete(content_type, &[content_id.to_string()], language_code)
            .await?;
        if deleted > 0 {
            self.mutated(content_type, content_id);
        }
        Ok(deleted)
    }

    fn mutated(&self, content_type: ContentType, content_id: &str) {
        TranslationMetrics::global().record_mutation();
        for listener in &self.listeners {
            listener.on_mutated(content_type, content_id);
        }
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<CreateKey, Arc<tokio::sync::Mutex<()>>>> {
        self.create_locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn create_lock(&self, key: &CreateKey) -> Arc<tokio::sync::Mutex<()>> {
        self.locks().entry(key.clone()).or_default().clone()
    }

    fn lock_release(&self, key: CreateKey) -> CreateLockRelease<'_> {
        CreateLockRelease {
            locks: &self.create_locks,
            key,
        }
    }
}
