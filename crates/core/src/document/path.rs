//! Slash-separated paths addressing collections and documents.
//!
//! A path alternates collection and document-id segments, so a document path
//! always has an even number of segments (`brands/b1/models/m2/phones/p3`)
//! and a collection path an odd number. Segments must not contain `/`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a malformed path string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsePathError {
    /// A path segment was empty.
    #[error("path contains an empty segment")]
    EmptySegment,
    /// The segment count does not match the expected path shape.
    #[error("expected an even number of segments for a document path")]
    NotADocument,
}

/// Path to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath(Vec<String>);

/// Path to a collection, either top-level or nested under a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    /// A top-level collection.
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// The path of a document inside this collection.
    #[must_use]
    pub fn doc(&self, id: impl Into<String>) -> DocPath {
        let mut segments = self.0.clone();
        segments.push(id.into());
        DocPath(segments)
    }

    /// The collection's name (final segment).
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// The raw path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl DocPath {
    /// The document's id (final segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// A subcollection nested under this document.
    #[must_use]
    pub fn collection(&self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.0.clone();
        segments.push(name.into());
        CollectionPath(segments)
    }

    /// The collection this document belongs to.
    #[must_use]
    pub fn parent(&self) -> CollectionPath {
        CollectionPath(self.0[..self.0.len() - 1].to_vec())
    }

    /// The raw path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this document sits directly inside the given collection.
    #[must_use]
    pub fn is_in(&self, collection: &CollectionPath) -> bool {
        self.0.len() == collection.0.len() + 1 && self.0.starts_with(&collection.0)
    }
}

impl std::fmt::Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl std::str::FromStr for DocPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ParsePathError::EmptySegment);
        }
        if segments.len() % 2 != 0 {
            return Err(ParsePathError::NotADocument);
        }
        Ok(Self(segments))
    }
}

impl TryFrom<String> for DocPath {
    type Error = ParsePathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> Self {
        path.to_string()
    }
}
