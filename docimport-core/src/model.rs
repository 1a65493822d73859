//! Input tree produced by the documentation parser.
//!
//! Everything here is read-only from the importer's point of view: one
//! [`SourceFile`] per parsed file, holding its top-level functions and its
//! classes (which in turn hold their methods). Fields the parser may omit
//! default to empty values so partially-populated exports still load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One parsed source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the parsed root, e.g. `wp-includes/post.php`.
    pub path: String,
    /// File-level docblock.
    #[serde(default)]
    pub file: Docblock,
    #[serde(default)]
    pub functions: Vec<DocumentedEntity>,
    #[serde(default)]
    pub classes: Vec<DocumentedEntity>,
}

/// A documented function, method or class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentedEntity {
    pub name: String,
    #[serde(default)]
    pub line: u64,
    /// Argument descriptors, kept verbatim so they can be persisted as-is.
    #[serde(default)]
    pub arguments: Vec<Value>,
    #[serde(default)]
    pub doc: Docblock,
    #[serde(default)]
    pub visibility: String,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Only populated for classes.
    #[serde(default)]
    pub methods: Vec<DocumentedEntity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Docblock {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub tags: DocTags,
}

/// A single doc tag such as `@since 2.0` or `@param int $id`.
///
/// Only `name` and `content` are interpreted; whatever else the parser
/// attached (types, variable names, ...) is carried along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DocTag {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Ordered list of doc tags with lookup by tag name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocTags(pub Vec<DocTag>);

impl DocTags {
    /// First tag with the given name, in source order.
    pub fn first(&self, name: &str) -> Option<&DocTag> {
        self.0.iter().find(|tag| tag.name == name)
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> + 'a {
        self.0.iter().filter(move |tag| tag.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<DocTag>> for DocTags {
    fn from(tags: Vec<DocTag>) -> Self {
        DocTags(tags)
    }
}
