//! Multi-language content translation engine.
//!
//! Translations of CMS content (posts, products, brokers) are stored per
//! language next to their parent item. The engine resolves fields with
//! fallback to the default language, measures completeness against the
//! required languages, and validates and applies mutations while notifying
//! caches of what changed.

pub mod bulk;
pub mod cache;
pub mod completeness;
pub mod config;
pub mod error;
pub mod i18n;
pub mod manager;
pub mod model;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod schema;
pub mod status;
pub mod store;

pub use bulk::{BulkCopyResult, BulkDeleteResult, BulkItemError, BulkOperations};
pub use cache::{CachedTranslations, InvalidationListener, TranslationCache};
pub use completeness::{
    get_batch_stats, get_completeness, is_complete, BatchTranslationStats, TranslationCompleteness,
};
pub use error::{FieldError, StoreError, TranslationError};
pub use manager::{MutationResult, TranslationManager};
pub use model::{ContentItem, ContentKey, FieldPatch, FieldValues, Translation};
pub use resolver::{resolve_field, FieldResolver, TranslatedFieldResult};
pub use schema::ContentType;
pub use status::{get_translation_status, TranslationStatus};
pub use store::{MemoryStore, PgStore, TranslationStore};
