/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document access.
//!
//! Pages and the data they reference live in named collections of
//! documents. The controller only depends on [`DocumentStore`]; the
//! in-memory implementation here backs the CLI and the tests.

use ido_config::path::{lookup_in, split};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A single document.
pub type Document = Map<String, Value>;

/// Key naming the collection of a reference.
pub const REFERENCE_COLLECTION: &str = "collection";
/// Key holding a document identifier.
pub const ID_KEY: &str = "_id";
/// Extended-JSON object id wrapper.
pub const OID_KEY: &str = "$oid";

/// References are not followed past this depth.
pub const MAX_REFERENCE_DEPTH: usize = 8;

/// Errors from document access.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document source could not be read.
    #[error("Failed to load documents from {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Document data does not have the expected shape.
    #[error("Invalid document data: {0}")]
    InvalidData(String),

    /// Query options could not be interpreted.
    #[error("Invalid select options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One sort key: a dot path into the document and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// Options for [`DocumentStore::select`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    /// Maximum number of documents returned when selecting many.
    pub limit: Option<usize>,

    /// Sort keys, most significant first.
    pub sort: Vec<SortKey>,

    /// Replace references below the top level with the documents they name.
    pub expand_references: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            limit: None,
            sort: Vec::new(),
            expand_references: true,
        }
    }
}

impl SelectOptions {
    /// Read options from a mapping such as `{"limit": 5, "sort": [...]}`.
    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        Ok(Self::deserialize(value)?)
    }
}

/// Access to named collections of documents.
pub trait DocumentStore {
    /// Select documents of `collection` matching `filter`.
    ///
    /// Every filter entry is a dot path that must equal the given value.
    /// With `multiple` false at most one document is returned. A missing
    /// collection yields no documents.
    fn select(
        &self,
        collection: &str,
        filter: &Document,
        options: &SelectOptions,
        multiple: bool,
    ) -> Result<Vec<Document>, DocumentError>;
}

/// Documents held in memory, keyed by collection name.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: HashMap<String, Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `{collection: [document, ...], ...}`.
    pub fn from_map(data: Map<String, Value>) -> Result<Self, DocumentError> {
        let mut store = Self::new();
        for (collection, documents) in data {
            let Value::Array(items) = documents else {
                return Err(DocumentError::InvalidData(format!(
                    "collection '{collection}' must be a sequence of documents"
                )));
            };
            for item in items {
                let Value::Object(document) = item else {
                    return Err(DocumentError::InvalidData(format!(
                        "collection '{collection}' contains a non-mapping entry"
                    )));
                };
                store.insert(&collection, document);
            }
        }
        Ok(store)
    }

    /// Load collections from a JSON, YAML or TOML file.
    pub fn load_file(path: &Path) -> Result<Self, DocumentError> {
        let data = ido_config::load::read_file(path).map_err(|e| DocumentError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_map(data)
    }

    pub fn insert(&mut self, collection: &str, document: Document) -> &mut Self {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        self
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }

    fn find_by_id(&self, collection: &str, id: &str) -> Option<&Document> {
        self.collections
            .get(collection)?
            .iter()
            .find(|document| document_id(document) == Some(id))
    }

    fn expand_document(&self, document: Document, depth: usize) -> Document {
        document
            .into_iter()
            .map(|(key, value)| (key, self.expand_value(value, depth + 1)))
            .collect()
    }

    fn expand_value(&self, value: Value, depth: usize) -> Value {
        match value {
            Value::Object(map) => {
                if let Some((collection, id)) = reference_target(&map) {
                    if depth > MAX_REFERENCE_DEPTH {
                        debug!(collection, id, "reference depth limit reached");
                        return Value::Object(map);
                    }
                    match self.find_by_id(collection, id) {
                        Some(target) => {
                            let target = target.clone();
                            return Value::Object(self.expand_document(target, depth));
                        }
                        None => debug!(collection, id, "dangling reference"),
                    }
                }
                Value::Object(self.expand_document(map, depth))
            }
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.expand_value(item, depth + 1))
                    .collect(),
            ),
            other => other,
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn select(
        &self,
        collection: &str,
        filter: &Document,
        options: &SelectOptions,
        multiple: bool,
    ) -> Result<Vec<Document>, DocumentError> {
        let Some(documents) = self.collections.get(collection) else {
            debug!(collection, "no such collection");
            return Ok(Vec::new());
        };

        let mut found: Vec<&Document> = documents
            .iter()
            .filter(|document| matches_filter(document, filter))
            .collect();

        if !options.sort.is_empty() {
            found.sort_by(|a, b| compare_documents(a, b, &options.sort));
        }

        let limit = if multiple {
            options.limit.unwrap_or(usize::MAX)
        } else {
            1
        };

        Ok(found
            .into_iter()
            .take(limit)
            .map(|document| {
                if options.expand_references {
                    self.expand_document(document.clone(), 0)
                } else {
                    document.clone()
                }
            })
            .collect())
    }
}

/// The `(collection, id)` a reference mapping points at.
fn reference_target(map: &Map<String, Value>) -> Option<(&str, &str)> {
    let collection = map.get(REFERENCE_COLLECTION)?.as_str()?;
    let id = map.get(ID_KEY)?.get(OID_KEY)?.as_str()?;
    Some((collection, id))
}

/// A document's id, as `{"_id": {"$oid": id}}` or `{"_id": id}`.
fn document_id(document: &Document) -> Option<&str> {
    match document.get(ID_KEY)? {
        Value::String(id) => Some(id),
        other => other.get(OID_KEY)?.as_str(),
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(path, expected)| lookup_in(document, split(path)) == Some(expected))
}

fn compare_documents(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(
            lookup_in(a, split(&key.field)),
            lookup_in(b, split(&key.field)),
        );
        let ordering = match key.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Missing values sort last; numbers compare numerically, everything else
/// by its text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => ido_config::to_text(x).cmp(&ido_config::to_text(y)),
    }
}
