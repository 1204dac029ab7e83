//! Response post-processing and result assembly.
//!
//! Raw generation output is line-oriented: responses are split into lines,
//! scrubbed of list markers and boilerplate, bounded, and deduplicated.
//! The helpers here also slice category lines across documents and build
//! the final section objects.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    CombinedAnalysis, Document, DocumentAnalysis, StudyGuideSection, OVERVIEW_SECTION_ID,
};

/// Lines starting with these phrases are model boilerplate, not content.
const BOILERPLATE_PREFIXES: &[&str] = &["I apologize", "I cannot", "Here are", "Based on"];

/// Leading list markers stripped from response lines.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]\s+|\d{1,3}[.)]\s+)").unwrap());

/// Deduplicate preserving first occurrence.
pub fn dedup_preserving<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Clean one raw generation response into bounded content lines.
///
/// Splits into lines, strips list markers, drops empty lines and
/// boilerplate, deduplicates, and truncates to `max_lines`.
pub fn clean_lines(raw: &str, max_lines: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for line in raw.lines() {
        let stripped = LIST_MARKER.replace(line.trim(), "");
        let cleaned = stripped.trim();
        if cleaned.is_empty() {
            continue;
        }
        if BOILERPLATE_PREFIXES.iter().any(|p| cleaned.starts_with(p)) {
            continue;
        }
        if seen.insert(cleaned.to_string()) {
            lines.push(cleaned.to_string());
        }
        if lines.len() >= max_lines {
            break;
        }
    }

    lines
}

/// Slice a category's global line list for the document at `index`.
///
/// Each document owns a window of `per_doc` lines; a document whose window
/// falls past the end of the list is backfilled from the head so every
/// document receives content.
pub fn slice_window(global: &[String], index: usize, per_doc: usize) -> Vec<String> {
    let start = index * per_doc;
    let window: Vec<String> = global.iter().skip(start).take(per_doc).cloned().collect();
    if !window.is_empty() {
        return window;
    }
    global.iter().take(per_doc).cloned().collect()
}

/// Bounded content preview, safe on multi-byte text.
pub fn content_preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Union every per-document analysis into one combined analysis.
pub fn union_analyses(per_document: &[DocumentAnalysis], marked_document: String) -> CombinedAnalysis {
    let collect = |field: fn(&DocumentAnalysis) -> &Vec<String>| {
        dedup_preserving(per_document.iter().flat_map(field).cloned())
    };
    CombinedAnalysis {
        key_terms: collect(|a| &a.key_terms),
        examples: collect(|a| &a.examples),
        questions: collect(|a| &a.questions),
        study_notes: collect(|a| &a.study_notes),
        key_takeaways: collect(|a| &a.key_takeaways),
        annotations: collect(|a| &a.annotations),
        marked_document,
    }
}

/// Build the section for one document from its analysis.
pub fn document_section(
    document: &Document,
    analysis: &DocumentAnalysis,
    preview_chars: usize,
) -> StudyGuideSection {
    StudyGuideSection {
        id: document.id.clone(),
        title: document.name.clone(),
        content: content_preview(&document.raw_text, preview_chars),
        keywords: analysis.key_terms.clone(),
        examples: analysis.examples.clone(),
        questions: analysis.questions.clone(),
        annotations: analysis.annotations.clone(),
        summaries: dedup_preserving(
            analysis
                .study_notes
                .iter()
                .chain(analysis.key_takeaways.iter())
                .cloned(),
        ),
    }
}

/// Build the synthesized overview section from the combined analysis.
///
/// Prefixed to the section list only when the guide covers more than one
/// document.
pub fn overview_section(combined: &CombinedAnalysis, names: &[String]) -> StudyGuideSection {
    let mut content = format!(
        "Combined study guide covering {} documents: {}.",
        names.len(),
        names.join(", ")
    );
    for takeaway in combined.key_takeaways.iter().take(3) {
        content.push('\n');
        content.push_str(takeaway);
    }

    StudyGuideSection {
        id: OVERVIEW_SECTION_ID.to_string(),
        title: "Overview".to_string(),
        content,
        keywords: combined.key_terms.iter().take(20).cloned().collect(),
        questions: combined.questions.iter().take(10).cloned().collect(),
        examples: combined.examples.iter().take(8).cloned().collect(),
        annotations: combined.annotations.iter().take(8).cloned().collect(),
        summaries: dedup_preserving(
            combined
                .study_notes
                .iter()
                .chain(combined.key_takeaways.iter())
                .cloned(),
        )
        .into_iter()
        .take(8)
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lines_strips_markers_and_boilerplate() {
        let raw = "Here are 5 questions:\n\n1. What is mitosis?\n- How do cells divide?\nI apologize, but...\n2. What is mitosis?\n";
        let lines = clean_lines(raw, 10);
        assert_eq!(
            lines,
            vec!["What is mitosis?".to_string(), "How do cells divide?".to_string()]
        );
    }

    #[test]
    fn test_clean_lines_bounded() {
        let raw = (0..30).map(|i| format!("line {i}\n")).collect::<String>();
        assert_eq!(clean_lines(&raw, 10).len(), 10);
    }

    #[test]
    fn test_clean_lines_empty_input() {
        assert!(clean_lines("", 10).is_empty());
        assert!(clean_lines("\n\n  \n", 10).is_empty());
    }

    #[test]
    fn test_dedup_preserving_order() {
        let items = ["b", "a", "b", "c", "a"].map(String::from);
        assert_eq!(dedup_preserving(items), ["b", "a", "c"].map(String::from));
    }

    #[test]
    fn test_slice_window_assigns_disjoint_ranges() {
        let global: Vec<String> = (0..6).map(|i| format!("l{i}")).collect();
        assert_eq!(slice_window(&global, 0, 2), ["l0", "l1"].map(String::from));
        assert_eq!(slice_window(&global, 1, 2), ["l2", "l3"].map(String::from));
        assert_eq!(slice_window(&global, 2, 2), ["l4", "l5"].map(String::from));
    }

    #[test]
    fn test_slice_window_backfills_from_head() {
        let global: Vec<String> = vec!["only".to_string(), "two".to_string()];
        assert_eq!(slice_window(&global, 4, 2), ["only", "two"].map(String::from));
    }

    #[test]
    fn test_slice_window_empty_global() {
        assert!(slice_window(&[], 0, 2).is_empty());
    }

    #[test]
    fn test_union_deduplicates_across_documents() {
        let a = DocumentAnalysis {
            key_terms: vec!["Mitosis".into(), "Cell".into()],
            questions: vec!["Q1".into()],
            ..Default::default()
        };
        let b = DocumentAnalysis {
            key_terms: vec!["Cell".into(), "Meiosis".into()],
            questions: vec!["Q1".into(), "Q2".into()],
            ..Default::default()
        };
        let combined = union_analyses(&[a, b], "text".to_string());
        assert_eq!(
            combined.key_terms,
            ["Mitosis", "Cell", "Meiosis"].map(String::from)
        );
        assert_eq!(combined.questions, ["Q1", "Q2"].map(String::from));
        assert_eq!(combined.marked_document, "text");
    }

    #[test]
    fn test_content_preview_bounded_on_multibyte() {
        let text = "é".repeat(1000);
        let preview = content_preview(&text, 800);
        assert_eq!(preview.chars().count(), 800);
    }

    #[test]
    fn test_overview_section_slices() {
        let combined = CombinedAnalysis {
            key_terms: (0..30).map(|i| format!("t{i}")).collect(),
            questions: (0..30).map(|i| format!("q{i}")).collect(),
            examples: (0..30).map(|i| format!("e{i}")).collect(),
            annotations: (0..30).map(|i| format!("a{i}")).collect(),
            study_notes: (0..30).map(|i| format!("n{i}")).collect(),
            key_takeaways: (0..30).map(|i| format!("k{i}")).collect(),
            marked_document: String::new(),
        };
        let names = vec!["a.md".to_string(), "b.md".to_string()];
        let section = overview_section(&combined, &names);
        assert_eq!(section.id, OVERVIEW_SECTION_ID);
        assert_eq!(section.keywords.len(), 20);
        assert_eq!(section.questions.len(), 10);
        assert_eq!(section.examples.len(), 8);
        assert_eq!(section.annotations.len(), 8);
        assert_eq!(section.summaries.len(), 8);
        assert!(section.content.contains("a.md, b.md"));
    }
}
