//! Translation store: CRUD over the backing datastore.
//!
//! The engine only talks to storage through [`TranslationStore`]. Two
//! implementations ship with the crate: [`MemoryStore`] for tests and
//! embedding, and [`PgStore`] over PostgreSQL.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::{StoreError, StoreResult};
use crate::model::{ContentItem, FieldPatch, Translation};
use crate::schema::ContentType;
use async_trait::async_trait;

/// Storage operations for translations of every content type.
///
/// Implementations provide per-row atomicity only. `insert` assigns the id
/// and both timestamps; `update` refreshes `updated_at`.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Translations of one content item, ordered by `language_code` ascending.
    async fn list(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: Option<&str>,
    ) -> StoreResult<Vec<Translation>>;

    async fn get(&self, content_type: ContentType, id: &str) -> StoreResult<Option<Translation>>;

    async fn insert(&self, translation: Translation) -> StoreResult<Translation>;

    /// Apply a partial update. Fails with [`StoreError::NotFound`] for an unknown id.
    async fn update(
        &self,
        content_type: ContentType,
        id: &str,
        patch: &FieldPatch,
    ) -> StoreResult<Translation>;

    /// Fails with [`StoreError::NotFound`] for an unknown id.
    async fn delete(&self, content_type: ContentType, id: &str) -> StoreResult<()>;

    /// Parent items, newest first, each with its full set of translations.
    async fn list_with_parent(&self, content_type: ContentType) -> StoreResult<Vec<ContentItem>>;

    /// Delete translations of the given items, optionally in one language only.
    /// Returns the number of rows removed.
    async fn bulk_delete(
        &self,
        content_type: ContentType,
        content_ids: &[String],
        language_code: Option<&str>,
    ) -> StoreResult<u64>;
}

impl StoreError {
    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::NotFound { .. } | StoreError::UniqueViolation { .. } => false,
            StoreError::Database(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            StoreError::Backend(_) => true,
        }
    }
}
