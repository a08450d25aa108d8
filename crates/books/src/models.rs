//! Flattened book-metadata records.

use std::collections::BTreeMap;

/// A book-metadata record flattened from the vendor's XML response.
///
/// Holds every element's tag → text. Later occurrences of a tag overwrite
/// earlier ones, matching the vendor's flat single-record responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookRecord {
    fields: BTreeMap<String, String>,
}

impl BookRecord {
    pub fn insert(&mut self, tag: &str, text: &str) {
        self.fields.insert(tag.to_string(), text.to_string());
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn publisher(&self) -> Option<&str> {
        self.get("publisher")
    }

    pub fn contributor(&self) -> Option<&str> {
        self.get("contributor")
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.get("publication_date")
    }

    /// The 13-digit ISBN when present, falling back to the 10-digit form.
    pub fn isbn(&self) -> Option<&str> {
        self.get("isbn13").or_else(|| self.get("isbn10"))
    }

    /// Iterate over (tag, text) pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
