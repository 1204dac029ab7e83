//! Deterministic fallback content.
//!
//! When the inference service is unreachable or returns nothing usable,
//! every category still produces study content from these templates. The
//! `{names}` placeholder is filled with the document names so the output
//! stays tied to what the student actually uploaded.

use super::GenerationKind;

const QUESTIONS_FALLBACK: &[&str] = &[
    "What are the main topics covered in {names}?",
    "Which key terms in {names} would you need to define on an exam?",
    "How do the central concepts in {names} relate to one another?",
    "What would you explain first if you had to teach {names} to someone else?",
];

const STUDY_NOTES_FALLBACK: &[&str] = &[
    "Work through {names} section by section and restate each heading in your own words.",
    "List the key terms in {names} and write a one-line definition for each.",
    "Summarize every major section of {names} in two sentences or less.",
    "Mark any passage of {names} you cannot restate from memory for a second pass.",
];

const KEY_TAKEAWAYS_FALLBACK: &[&str] = &[
    "The headings of {names} outline its core argument; learn the outline first.",
    "Repeated terms across {names} signal the concepts most likely to be tested.",
    "Examples in {names} exist to anchor the abstract points; study them in pairs.",
    "Review {names} once for structure and once for detail.",
];

const ANNOTATIONS_FALLBACK: &[&str] = &[
    "Definitions in {names} are worth memorizing verbatim.",
    "Emphasized phrases in {names} mark what the author considered essential.",
    "Lists and numbered steps in {names} are natural flashcard material.",
    "Cross-reference overlapping topics between sections of {names}.",
];

const EXAMPLES_FALLBACK: &[&str] = &[
    "Re-read the worked examples in {names} and solve them again without looking.",
    "For each concept in {names}, construct one example of your own.",
    "Turn any step-by-step passage in {names} into a numbered procedure.",
];

/// Deterministic, document-name-aware fallback lines for a category.
pub fn fallback_lines(kind: GenerationKind, names: &str) -> Vec<String> {
    let templates = match kind {
        GenerationKind::Questions => QUESTIONS_FALLBACK,
        GenerationKind::StudyNotes => STUDY_NOTES_FALLBACK,
        GenerationKind::KeyTakeaways => KEY_TAKEAWAYS_FALLBACK,
        GenerationKind::Annotations => ANNOTATIONS_FALLBACK,
        GenerationKind::Examples => EXAMPLES_FALLBACK,
    };
    templates
        .iter()
        .map(|t| t.replace("{names}", names))
        .collect()
}

/// Category fallback as a single newline-joined string, for the gateway's
/// fail-closed `generate` surface where no document names are in scope.
pub fn fallback_text(kind: GenerationKind) -> String {
    fallback_lines(kind, "the uploaded documents").join("\n")
}
