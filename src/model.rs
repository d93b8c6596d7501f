//! Translation records and content items.

use crate::schema::{ContentType, TranslationRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to value, as supplied by an editor when creating a translation.
pub type FieldValues = BTreeMap<String, String>;

/// Partial update: `Some` sets a field, `None` clears it.
pub type FieldPatch = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTranslation {
    pub id: String,
    pub post_id: String,
    pub language_code: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTranslation {
    pub id: String,
    pub product_id: String,
    pub language_code: String,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerTranslation {
    pub id: String,
    pub broker_id: String,
    pub language_code: String,
    pub description: String,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One language variant of a content item, tagged with its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "content_type")]
pub enum Translation {
    #[serde(rename = "posts")]
    Post(PostTranslation),
    #[serde(rename = "products")]
    Product(ProductTranslation),
    #[serde(rename = "brokers")]
    Broker(BrokerTranslation),
}

/// Applies the same expression to whichever record the translation holds.
macro_rules! with_record {
    ($translation:expr, $record:ident => $body:expr) => {
        match $translation {
            Translation::Post($record) => $body,
            Translation::Product($record) => $body,
            Translation::Broker($record) => $body,
        }
    };
}

impl Translation {
    /// An empty translation with every field unset.
    pub fn blank(
        content_type: ContentType,
        id: impl Into<String>,
        content_id: impl Into<String>,
        language_code: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let content_id = content_id.into();
        let language_code = language_code.into();

        match content_type {
            ContentType::Posts => Translation::Post(PostTranslation {
                id,
                post_id: content_id,
                language_code,
                title: String::new(),
                excerpt: None,
                content: None,
                meta_title: None,
                meta_description: None,
                created_at: now,
                updated_at: now,
            }),
            ContentType::Products => Translation::Product(ProductTranslation {
                id,
                product_id: content_id,
                language_code,
                name: String::new(),
                description: None,
                short_description: None,
                created_at: now,
                updated_at: now,
            }),
            ContentType::Brokers => Translation::Broker(BrokerTranslation {
                id,
                broker_id: content_id,
                language_code,
                description: String::new(),
                pros: None,
                cons: None,
                created_at: now,
                updated_at: now,
            }),
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Translation::Post(_) => PostTranslation::CONTENT_TYPE,
            Translation::Product(_) => ProductTranslation::CONTENT_TYPE,
            Translation::Broker(_) => BrokerTranslation::CONTENT_TYPE,
        }
    }

    pub fn id(&self) -> &str {
        with_record!(self, t => &t.id)
    }

    pub fn content_id(&self) -> &str {
        match self {
            Translation::Post(t) => &t.post_id,
            Translation::Product(t) => &t.product_id,
            Translation::Broker(t) => &t.broker_id,
        }
    }

    pub fn language_code(&self) -> &str {
        with_record!(self, t => &t.language_code)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        with_record!(self, t => t.created_at)
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        with_record!(self, t => t.updated_at)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        with_record!(self, t => t.id = id)
    }

    pub fn set_created_at(&mut self, at: DateTime<Utc>) {
        with_record!(self, t => t.created_at = at)
    }

    pub fn set_updated_at(&mut self, at: DateTime<Utc>) {
        with_record!(self, t => t.updated_at = at)
    }

    /// Raw value of a translatable field, `None` if unset or not part of the schema.
    pub fn field(&self, name: &str) -> Option<&str> {
        with_record!(self, t => t.field(name))
    }

    /// Value of a field only when it holds non-whitespace text.
    pub fn non_empty_field(&self, name: &str) -> Option<&str> {
        self.field(name).filter(|v| !v.trim().is_empty())
    }

    /// Returns false when the field is not part of this translation's schema.
    pub fn set_field(&mut self, name: &str, value: Option<String>) -> bool {
        with_record!(self, t => t.set_field(name, value))
    }

    /// Every translatable field that currently holds a value.
    pub fn field_values(&self) -> FieldValues {
        self.content_type()
            .schema()
            .translatable_fields()
            .into_iter()
            .filter_map(|name| self.field(name).map(|v| (name.to_string(), v.to_string())))
            .collect()
    }
}

/// Identifies the set of translations belonging to one content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey {
    pub content_type: ContentType,
    pub content_id: String,
}

impl ContentKey {
    pub fn new(content_type: ContentType, content_id: impl Into<String>) -> Self {
        Self {
            content_type,
            content_id: content_id.into(),
        }
    }
}

/// A parent content item with its attached translations.
///
/// `attributes` holds the item's own untranslated columns, which act as the
/// last-resort source when no translation carries a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub translations: Vec<Translation>,
}

impl ContentItem {
    pub fn new(content_type: ContentType, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type,
            created_at: Utc::now(),
            attributes: BTreeMap::new(),
            translations: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_translation(mut self, translation: Translation) -> Self {
        self.translations.push(translation);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn key(&self) -> ContentKey {
        ContentKey::new(self.content_type, self.id.clone())
    }
}
