//! Batch operations across many content items.
//!
//! Items are processed independently, a bounded number at a time; a failure
//! on one item is reported against its content id and does not stop the others.

use crate::error::TranslationError;
use crate::manager::TranslationManager;
use crate::resolver::find_translation;
use crate::schema::ContentType;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// A failure tied to one content item, or to the whole batch when `content_id` is `None`.
#[derive(Debug)]
pub struct BulkItemError {
    pub content_id: Option<String>,
    pub error: TranslationError,
}

impl fmt::Display for BulkItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content_id {
            Some(id) => write!(f, "{}: {}", id, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

#[derive(Debug)]
pub struct BulkDeleteResult {
    /// No item failed
    pub success: bool,
    /// Rows actually removed
    pub deleted_count: u64,
    pub errors: Vec<BulkItemError>,
}

#[derive(Debug)]
pub struct BulkCopyResult {
    pub success: bool,
    pub copied_count: usize,
    /// Items with no source translation, or with a target kept because `overwrite` was off
    pub skipped: Vec<String>,
    pub errors: Vec<BulkItemError>,
}

enum CopyOutcome {
    Copied,
    Skipped,
}

/// Items processed at once unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 8;

pub struct BulkOperations {
    manager: Arc<TranslationManager>,
    concurrency: usize,
}

fn distinct(content_ids: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(content_ids.len());
    for id in content_ids {
        if !seen.contains(&id.as_str()) {
            seen.push(id);
        }
    }
    seen
}

impl BulkOperations {
    pub fn new(manager: Arc<TranslationManager>) -> Self {
        Self {
            manager,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit how many items are in flight against the store at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Delete the translations of every given item, optionally in one language only.
    pub async fn bulk_delete(
        &self,
        content_type: ContentType,
        content_ids: &[String],
        language_code: Option<&str>,
    ) -> BulkDeleteResult {
        if let Some(code) = language_code {
            if let Err(error) = self.manager.languages().language(code) {
                return BulkDeleteResult {
                    success: false,
                    deleted_count: 0,
                    errors: vec![BulkItemError {
                        content_id: None,
                        error,
                    }],
                };
            }
        }

        let ids = distinct(content_ids);
        let outcomes: Vec<_> = stream::iter(ids.iter().map(|id| async move {
            let outcome = self
                .manager
                .delete_for_content(content_type, id, language_code)
                .await;
            (*id, outcome)
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut deleted_count = 0;
        let mut errors = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(deleted) => deleted_count += deleted,
                Err(error) => {
                    warn!(%content_type, content_id = id, "Bulk delete failed: {}", error);
                    errors.push(BulkItemError {
                        content_id: Some(id.to_string()),
                        error,
                    });
                }
            }
        }

        info!(
            %content_type,
            items = ids.len(),
            deleted_count,
            failed = errors.len(),
            "Bulk delete finished"
        );
        BulkDeleteResult {
            success: errors.is_empty(),
            deleted_count,
            errors,
        }
    }

    /// Copy each item's translation in `from` into `to`.
    ///
    /// An existing target translation is replaced only when `overwrite` is set.
    pub async fn bulk_copy(
        &self,
        content_type: ContentType,
        content_ids: &[String],
        from: &str,
        to: &str,
        overwrite: bool,
    ) -> BulkCopyResult {
        if let Err(error) = self.check_copy_languages(from, to) {
            return BulkCopyResult {
                success: false,
                copied_count: 0,
                skipped: Vec::new(),
                errors: vec![BulkItemError {
                    content_id: None,
                    error,
                }],
            };
        }

        let ids = distinct(content_ids);
        let outcomes: Vec<_> = stream::iter(ids.iter().map(|id| async move {
            let outcome = self.copy_one(content_type, id, from, to, overwrite).await;
            (*id, outcome)
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut result = BulkCopyResult {
            success: true,
            copied_count: 0,
            skipped: Vec::new(),
            errors: Vec::new(),
        };
        for (id, outcome) in outcomes {
            match outcome {
                Ok(CopyOutcome::Copied) => result.copied_count += 1,
                Ok(CopyOutcome::Skipped) => result.skipped.push(id.to_string()),
                Err(error) => {
                    warn!(%content_type, content_id = id, from, to, "Bulk copy failed: {}", error);
                    result.errors.push(BulkItemError {
                        content_id: Some(id.to_string()),
                        error,
                    });
                }
            }
        }
        result.success = result.errors.is_empty();

        info!(
            %content_type,
            from,
            to,
            copied = result.copied_count,
            skipped = result.skipped.len(),
            failed = result.errors.len(),
            "Bulk copy finished"
        );
        result
    }

    fn check_copy_languages(&self, from: &str, to: &str) -> Result<(), TranslationError> {
        let languages = self.manager.languages();
        languages.language(from)?;
        languages.language(to)?;
        if from == to {
            return Err(TranslationError::Validation {
                errors: vec![crate::error::FieldError::new(
                    "language_code",
                    "source and target language must differ",
                )],
            });
        }
        Ok(())
    }

    async fn copy_one(
        &self,
        content_type: ContentType,
        content_id: &str,
        from: &str,
        to: &str,
        overwrite: bool,
    ) -> Result<CopyOutcome, TranslationError> {
        let store = self.manager.store();

        let source = store.list(content_type, content_id, Some(from)).await?;
        let Some(source) = find_translation(&source, from) else {
            return Ok(CopyOutcome::Skipped);
        };

        if !overwrite && !store.list(content_type, content_id, Some(to)).await?.is_empty() {
            return Ok(CopyOutcome::Skipped);
        }

        let result = self
            .manager
            .upsert_translation(content_type, content_id, to, source.field_values())
            .await;
        match result.error {
            None => Ok(CopyOutcome::Copied),
            Some(error) => Err(error),
        }
    }
}
