//! Content-type schema registry.
//!
//! Static table mapping every content type to its translatable fields and to
//! the name of the column linking a translation to its parent item. The typed
//! accessor tables for each translation record live here too, so field lookups
//! by name never go through dynamic property access.

use crate::error::UnknownContentType;
use crate::model::{BrokerTranslation, PostTranslation, ProductTranslation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of translatable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Posts,
    Products,
    Brokers,
}

/// Field layout of one content type.
#[derive(Debug)]
pub struct ContentSchema {
    pub content_type: ContentType,
    /// Foreign-key column linking a translation to its parent (e.g. `post_id`)
    pub content_id_field: &'static str,
    /// Fields that must be non-empty for a translation to be complete
    pub required_fields: &'static [&'static str],
    /// Additional translatable fields, nullable
    pub optional_fields: &'static [&'static str],
    /// Table holding the parent content items
    pub parent_table: &'static str,
    /// Table holding the translations
    pub translation_table: &'static str,
}

impl ContentSchema {
    /// Required fields followed by optional fields.
    pub fn translatable_fields(&self) -> Vec<&'static str> {
        self.required_fields
            .iter()
            .chain(self.optional_fields)
            .copied()
            .collect()
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.contains(&field)
    }

    pub fn is_translatable(&self, field: &str) -> bool {
        self.is_required(field) || self.optional_fields.contains(&field)
    }
}

static POSTS: ContentSchema = ContentSchema {
    content_type: ContentType::Posts,
    content_id_field: "post_id",
    required_fields: &["title"],
    optional_fields: &["excerpt", "content", "meta_title", "meta_description"],
    parent_table: "posts",
    translation_table: "post_translations",
};

static PRODUCTS: ContentSchema = ContentSchema {
    content_type: ContentType::Products,
    content_id_field: "product_id",
    required_fields: &["name"],
    optional_fields: &["description", "short_description"],
    parent_table: "products",
    translation_table: "product_translations",
};

static BROKERS: ContentSchema = ContentSchema {
    content_type: ContentType::Brokers,
    content_id_field: "broker_id",
    required_fields: &["description"],
    optional_fields: &["pros", "cons"],
    parent_table: "brokers",
    translation_table: "broker_translations",
};

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Posts, ContentType::Products, ContentType::Brokers];

    pub fn schema(self) -> &'static ContentSchema {
        match self {
            ContentType::Posts => &POSTS,
            ContentType::Products => &PRODUCTS,
            ContentType::Brokers => &BROKERS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Posts => "posts",
            ContentType::Products => "products",
            ContentType::Brokers => "brokers",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

pub fn required_fields(content_type: ContentType) -> &'static [&'static str] {
    content_type.schema().required_fields
}

pub fn optional_fields(content_type: ContentType) -> &'static [&'static str] {
    content_type.schema().optional_fields
}

pub fn translatable_fields(content_type: ContentType) -> Vec<&'static str> {
    content_type.schema().translatable_fields()
}

pub fn content_id_field(content_type: ContentType) -> &'static str {
    content_type.schema().content_id_field
}

// ==================== Typed Field Accessors ====================

/// Getter/setter pair for one translatable field of a record type.
pub struct FieldAccessor<T: 'static> {
    pub name: &'static str,
    pub get: fn(&T) -> Option<&str>,
    /// `None` clears an optional field; required fields become empty
    pub set: fn(&mut T, Option<String>),
}

/// A translation record with a static accessor table.
pub trait TranslationRecord: Sized + 'static {
    const CONTENT_TYPE: ContentType;
    const FIELDS: &'static [FieldAccessor<Self>];

    fn accessor(name: &str) -> Option<&'static FieldAccessor<Self>> {
        Self::FIELDS.iter().find(|a| a.name == name)
    }

    fn field(&self, name: &str) -> Option<&str> {
        Self::accessor(name).and_then(|a| (a.get)(self))
    }

    /// Returns false when the record has no field with this name.
    fn set_field(&mut self, name: &str, value: Option<String>) -> bool {
        match Self::accessor(name) {
            Some(a) => {
                (a.set)(self, value);
                true
            }
            None => false,
        }
    }
}

impl TranslationRecord for PostTranslation {
    const CONTENT_TYPE: ContentType = ContentType::Posts;
    const FIELDS: &'static [FieldAccessor<Self>] = &[
        FieldAccessor {
            name: "title",
            get: |t| Some(t.title.as_str()),
            set: |t, v| t.title = v.unwrap_or_default(),
        },
        FieldAccessor {
            name: "excerpt",
            get: |t| t.excerpt.as_deref(),
            set: |t, v| t.excerpt = v,
        },
        FieldAccessor {
            name: "content",
            get: |t| t.content.as_deref(),
            set: |t, v| t.content = v,
        },
        FieldAccessor {
            name: "meta_title",
            get: |t| t.meta_title.as_deref(),
            set: |t, v| t.meta_title = v,
        },
        FieldAccessor {
            name: "meta_description",
            get: |t| t.meta_description.as_deref(),
            set: |t, v| t.meta_description = v,
        },
    ];
}

impl TranslationRecord for ProductTranslation {
    const CONTENT_TYPE: ContentType = ContentType::Products;
    const FIELDS: &'static [FieldAccessor<Self>] = &[
        FieldAccessor {
            name: "name",
            get: |t| Some(t.name.as_str()),
            set: |t, v| t.name = v.unwrap_or_default(),
        },
        FieldAccessor {
            name: "description",
            get: |t| t.description.as_deref(),
            set: |t, v| t.description = v,
        },
        FieldAccessor {
            name: "short_description",
            get: |t| t.short_description.as_deref(),
            set: |t, v| t.short_description = v,
        },
    ];
}

impl TranslationRecord for BrokerTranslation {
    const CONTENT_TYPE: ContentType = ContentType::Brokers;
    const FIELDS: &'static [FieldAccessor<Self>] = &[
        FieldAccessor {
            name: "description",
            get: |t| Some(t.description.as_str()),
            set: |t, v| t.description = v.unwrap_or_default(),
        },
        FieldAccessor {
            name: "pros",
            get: |t| t.pros.as_deref(),
            set: |t, v| t.pros = v,
        },
        FieldAccessor {
            name: "cons",
            get: |t| t.cons.as_deref(),
            set: |t, v| t.cons = v,
        },
    ];
}
