//! Analysis result models.
//!
//! These are the structured outputs of a synthesis run, handed to the
//! presentation layer as read-only snapshots. All list-valued fields hold
//! deduplicated entries in insertion order.

use serde::{Deserialize, Serialize};

/// Study content attributed to a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Key terms extracted from the document text.
    pub key_terms: Vec<String>,
    /// Examples found in or generated for the document.
    pub examples: Vec<String>,
    /// Review questions.
    pub questions: Vec<String>,
    /// Condensed study notes.
    pub study_notes: Vec<String>,
    /// Key takeaways (long-form summary points).
    pub key_takeaways: Vec<String>,
    /// Margin-note style annotations.
    pub annotations: Vec<String>,
}

/// Union of every per-document analysis across a document set.
///
/// Rebuilt on every generation pass; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedAnalysis {
    pub key_terms: Vec<String>,
    pub examples: Vec<String>,
    pub questions: Vec<String>,
    pub study_notes: Vec<String>,
    pub key_takeaways: Vec<String>,
    pub annotations: Vec<String>,
    /// Concatenation of all raw document texts, used by the annotation pass.
    pub marked_document: String,
}

/// One renderable section of the study guide.
///
/// There is one section per document, optionally preceded by a synthesized
/// overview section when the guide covers more than one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyGuideSection {
    /// Section identifier (`overview` for the synthesized lead section,
    /// otherwise the source document's id).
    pub id: String,
    /// Section title.
    pub title: String,
    /// Content preview (raw text, bounded length).
    pub content: String,
    pub keywords: Vec<String>,
    pub examples: Vec<String>,
    pub questions: Vec<String>,
    pub annotations: Vec<String>,
    pub summaries: Vec<String>,
}

/// Id of the synthesized overview section.
pub const OVERVIEW_SECTION_ID: &str = "overview";
