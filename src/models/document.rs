//! Document model for study guide synthesis.
//!
//! Documents arrive with their text already extracted by the upstream
//! collaborator; the core never decodes file formats itself and never
//! mutates a document after construction.

use serde::{Deserialize, Serialize};

/// A source document submitted for study guide synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for this document.
    pub id: String,
    /// Display name (usually the original filename).
    pub name: String,
    /// Extracted text content.
    pub raw_text: String,
    /// Whitespace-delimited word count of `raw_text`.
    pub word_count: usize,
}

impl Document {
    /// Create a new document with a generated id and computed word count.
    pub fn new(name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            word_count: raw_text.split_whitespace().count(),
            raw_text,
        }
    }

    /// Create a document with an explicit id (for upstream collaborators
    /// that already track identity).
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        let raw_text = raw_text.into();
        Self {
            id: id.into(),
            name: name.into(),
            word_count: raw_text.split_whitespace().count(),
            raw_text,
        }
    }
}

/// Compute the fingerprint of a document set.
///
/// The fingerprint is derived from each document's `(name, content length)`
/// pair, so the same files submitted again map to the same synthesis result
/// without re-reading content.
pub fn fingerprint(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| format!("{}-{}", d.name, d.raw_text.len()))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        let doc = Document::new("notes.md", "one two  three\nfour");
        assert_eq!(doc.word_count, 4);
    }

    #[test]
    fn test_fingerprint_stable_across_ids() {
        let a = vec![
            Document::new("a.txt", "hello world"),
            Document::new("b.txt", "more text here"),
        ];
        let b = vec![
            Document::new("a.txt", "hello world"),
            Document::new("b.txt", "more text here"),
        ];
        // Ids differ but the fingerprint only depends on (name, length).
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a), "a.txt-11|b.txt-14");
    }

    #[test]
    fn test_fingerprint_order_sensitive() {
        let doc1 = Document::new("a.txt", "x");
        let doc2 = Document::new("b.txt", "y");
        let forward = fingerprint(&[doc1.clone(), doc2.clone()]);
        let reverse = fingerprint(&[doc2, doc1]);
        assert_ne!(forward, reverse);
    }
}
