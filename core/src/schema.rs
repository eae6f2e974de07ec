//! Mapping host documents to an id and named text properties.

use crate::error::SchemaError;
use crate::DocId;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// A named text field of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property<'a> {
    pub name: Cow<'a, str>,
    pub text: Cow<'a, str>,
}

/// Resolves a document's id and the text properties to index.
pub trait DocumentAdapter<D: ?Sized> {
    fn doc_id(&self, doc: &D) -> Result<DocId, SchemaError>;

    /// Text properties in a stable order. The id field is never included.
    fn properties<'a>(&'a self, doc: &'a D) -> Result<Vec<Property<'a>>, SchemaError>;
}

type IdAccessor<T> = Box<dyn Fn(&T) -> DocId + Send + Sync>;
type TextAccessor<T> = Box<dyn Fn(&T) -> &str + Send + Sync>;

/// Declarative adapter for a Rust type: one id accessor plus an ordered list
/// of named text accessors.
///
/// ```
/// use ftsearch::Schema;
///
/// struct Book { id: u32, title: String, author: String }
///
/// let schema = Schema::<Book>::builder()
///     .id(|b| b.id)
///     .text("title", |b| b.title.as_str())
///     .text("author", |b| b.author.as_str())
///     .build()
///     .unwrap();
/// assert_eq!(schema.field_names().collect::<Vec<_>>(), ["title", "author"]);
/// ```
pub struct Schema<T> {
    id: IdAccessor<T>,
    fields: Vec<(String, TextAccessor<T>)>,
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { ids: Vec::new(), fields: Vec::new() }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("fields", &self.field_names().collect::<Vec<_>>()).finish()
    }
}

impl<T> DocumentAdapter<T> for Schema<T> {
    fn doc_id(&self, doc: &T) -> Result<DocId, SchemaError> {
        Ok((self.id)(doc))
    }

    fn properties<'a>(&'a self, doc: &'a T) -> Result<Vec<Property<'a>>, SchemaError> {
        Ok(self
            .fields
            .iter()
            .map(|(name, accessor)| Property { name: Cow::Borrowed(name.as_str()), text: Cow::Borrowed(accessor(doc)) })
            .collect())
    }
}

pub struct SchemaBuilder<T> {
    ids: Vec<IdAccessor<T>>,
    fields: Vec<(String, TextAccessor<T>)>,
}

impl<T> SchemaBuilder<T> {
    /// Designates the id accessor. Exactly one is allowed.
    pub fn id<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&T) -> DocId + Send + Sync + 'static,
    {
        self.ids.push(Box::new(accessor));
        self
    }

    /// Adds an indexed text field.
    pub fn text<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        self.fields.push((name.into(), Box::new(accessor)));
        self
    }

    pub fn build(mut self) -> Result<Schema<T>, SchemaError> {
        if self.ids.len() > 1 {
            return Err(SchemaError::DuplicateIdAccessor);
        }
        let id = self.ids.pop().ok_or(SchemaError::NoIdAccessor)?;
        Ok(Schema { id, fields: self.fields })
    }
}

/// Adapter for JSON objects.
///
/// The id is read from one integer field; every other top-level string field
/// is a property unless ignored. Non-string values are skipped.
#[derive(Debug, Clone)]
pub struct JsonAdapter {
    id_field: String,
    ignored: HashSet<String>,
}

impl Default for JsonAdapter {
    fn default() -> Self {
        Self::new("id")
    }
}

impl JsonAdapter {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self { id_field: id_field.into(), ignored: HashSet::new() }
    }

    /// Excludes a field from indexing.
    pub fn ignore(mut self, field: impl Into<String>) -> Self {
        self.ignored.insert(field.into());
        self
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }
}

impl DocumentAdapter<Value> for JsonAdapter {
    fn doc_id(&self, doc: &Value) -> Result<DocId, SchemaError> {
        let obj = doc.as_object().ok_or(SchemaError::NotAnObject)?;
        let field = || self.id_field.clone();
        match obj.get(&self.id_field) {
            None => Err(SchemaError::MissingId { field: field() }),
            Some(Value::Null) => Err(SchemaError::NullId { field: field() }),
            Some(v) => v
                .as_u64()
                .and_then(|n| DocId::try_from(n).ok())
                .ok_or_else(|| SchemaError::InvalidId { field: field(), value: v.to_string() }),
        }
    }

    fn properties<'a>(&'a self, doc: &'a Value) -> Result<Vec<Property<'a>>, SchemaError> {
        let obj = doc.as_object().ok_or(SchemaError::NotAnObject)?;
        Ok(obj
            .iter()
            .filter(|(name, _)| **name != self.id_field && !self.ignored.contains(name.as_str()))
            .filter_map(|(name, value)| {
                value.as_str().map(|text| Property { name: Cow::Borrowed(name.as_str()), text: Cow::Borrowed(text) })
            })
            .collect())
    }
}
