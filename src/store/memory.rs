//! In-process translation store.

use super::TranslationStore;
use crate::error::{StoreError, StoreResult};
use crate::model::{ContentItem, FieldPatch, Translation};
use crate::schema::ContentType;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Translation store kept in memory.
///
/// By default it rejects a second translation for the same
/// `(content_type, content_id, language_code)`, like a unique index would.
/// Individual content ids can be made to fail to exercise error paths.
pub struct MemoryStore {
    translations: RwLock<Vec<Translation>>,
    parents: RwLock<Vec<ContentItem>>,
    enforce_unique: bool,
    failing: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            translations: RwLock::new(Vec::new()),
            parents: RwLock::new(Vec::new()),
            enforce_unique: true,
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// A store with no uniqueness constraint, so concurrent inserts for the
    /// same language can both succeed.
    pub fn without_unique_constraint() -> Self {
        Self {
            enforce_unique: false,
            ..Self::new()
        }
    }

    /// Register a parent content item for `list_with_parent`.
    /// Translations attached to the item are ignored.
    pub fn add_parent(&self, mut item: ContentItem) {
        item.translations.clear();
        self.parents_mut().push(item);
    }

    /// Make every operation touching this content id fail.
    pub fn fail_for(&self, content_id: &str) {
        self.failing_ids().insert(content_id.to_string());
    }

    pub fn recover(&self, content_id: &str) {
        self.failing_ids().remove(content_id);
    }

    /// Number of stored translations across every content type.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self, content_id: &str) -> StoreResult<()> {
        if self.failing_ids().contains(content_id) {
            return Err(StoreError::Backend(format!(
                "connection refused while accessing content '{}'",
                content_id
            )));
        }
        Ok(())
    }

    fn rows(&self) -> RwLockReadGuard<'_, Vec<Translation>> {
        self.translations.read().unwrap_or_else(|e| e.into_inner())
    }

    fn rows_mut(&self) -> RwLockWriteGuard<'_, Vec<Translation>> {
        self.translations.write().unwrap_or_else(|e| e.into_inner())
    }

    fn parents_mut(&self) -> RwLockWriteGuard<'_, Vec<ContentItem>> {
        self.parents.write().unwrap_or_else(|e| e.into_inner())
    }

    fn failing_ids(&self) -> MutexGuard<'_, HashSet<String>> {
        self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_language(mut translations: Vec<Translation>) -> Vec<Translation> {
    translations.sort_by(|a, b| a.language_code().cmp(b.language_code()));
    translations
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn list(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: Option<&str>,
    ) -> StoreResult<Vec<Translation>> {
        self.check_available(content_id)?;

        let matching = self
            .rows()
            .iter()
            .filter(|t| t.content_type() == content_type && t.content_id() == content_id)
            .filter(|t| language_code.map_or(true, |code| t.language_code() == code))
            .cloned()
            .collect();

        Ok(sorted_by_language(matching))
    }

    async fn get(&self, content_type: ContentType, id: &str) -> StoreResult<Option<Translation>> {
        Ok(self
            .rows()
            .iter()
            .find(|t| t.content_type() == content_type && t.id() == id)
            .cloned())
    }

    async fn insert(&self, mut translation: Translation) -> StoreResult<Translation> {
        self.check_available(translation.content_id())?;

        let mut rows = self.rows_mut();
        if self.enforce_unique {
            let exists = rows.iter().any(|t| {
                t.content_type() == translation.content_type()
                    && t.content_id() == translation.content_id()
                    && t.language_code() == translation.language_code()
            });
            if exists {
                return Err(StoreError::UniqueViolation {
                    content_id: translation.content_id().to_string(),
                    language_code: translation.language_code().to_string(),
                });
            }
        }

        let now = Utc::now();
        translation.set_id(Uuid::new_v4().to_string());
        translation.set_created_at(now);
        translation.set_updated_at(now);

        rows.push(translation.clone());
        Ok(translation)
    }

    async fn update(
        &self,
        content_type: ContentType,
        id: &str,
        patch: &FieldPatch,
    ) -> StoreResult<Translation> {
        let mut rows = self.rows_mut();
        let row = rows
            .iter_mut()
            .find(|t| t.content_type() == content_type && t.id() == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        self.check_available(row.content_id())?;

        let mut updated = row.clone();
        for (field, value) in patch {
            if !updated.set_field(field, value.clone()) {
                return Err(StoreError::Backend(format!(
                    "column '{}' does not exist on {}",
                    field,
                    content_type.schema().translation_table
                )));
            }
        }
        updated.set_updated_at(Utc::now());

        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, content_type: ContentType, id: &str) -> StoreResult<()> {
        let mut rows = self.rows_mut();
        let index = rows
            .iter()
            .position(|t| t.content_type() == content_type && t.id() == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        self.check_available(rows[index].content_id())?;
        rows.remove(index);
        Ok(())
    }

    async fn list_with_parent(&self, content_type: ContentType) -> StoreResult<Vec<ContentItem>> {
        let mut items: Vec<ContentItem> = self
            .parents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|item| item.content_type == content_type)
            .cloned()
            .collect();

        let rows = self.rows();
        for item in &mut items {
            let translations = rows
                .iter()
                .filter(|t| t.content_type() == content_type && t.content_id() == item.id)
                .cloned()
                .collect();
            item.translations = sorted_by_language(translations);
        }

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn bulk_delete(
        &self,
        content_type: ContentType,
        content_ids: &[String],
        language_code: Option<&str>,
    ) -> StoreResult<u64> {
        for content_id in content_ids {
            self.check_available(content_id)?;
        }

        let mut rows = self.rows_mut();
        let before = rows.len();
        rows.retain(|t| {
            let targeted = t.content_type() == content_type
                && content_ids.iter().any(|id| id == t.content_id())
                && language_code.map_or(true, |code| t.language_code() == code);
            !targeted
        });

        Ok((before - rows.len()) as u64)
    }
}
