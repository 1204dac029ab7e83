//! Prompt templates for study content generation.
//!
//! Each category prompt uses `{names}` and `{content}` placeholders and asks
//! for plain line-separated output, which is what the synthesis
//! post-processing step expects.

use super::GenerationKind;

pub const QUESTIONS_PROMPT: &str = r#"You are building a study guide from course material. Read ALL of the provided documents before writing anything.

Write 8-10 review questions that test understanding of the material in: {names}

GUIDELINES:
1. Cover the WHOLE material, not just the opening paragraphs
2. Mix recall questions with "why" and "how" questions
3. Every question must be answerable from the documents alone
4. One question per line, no numbering, no preamble

Documents:
{content}

Respond with ONLY the questions, one per line."#;

pub const STUDY_NOTES_PROMPT: &str = r#"You are building a study guide from course material. Read ALL of the provided documents before writing anything.

Write 8-10 condensed study notes for: {names}

GUIDELINES:
1. Each note is one self-contained fact or concept a student should retain
2. Prefer precise statements over vague summaries
3. Cover every document, not just the first one
4. One note per line, no numbering, no preamble

Documents:
{content}

Respond with ONLY the notes, one per line."#;

pub const KEY_TAKEAWAYS_PROMPT: &str = r#"You are building a study guide from course material. Read ALL of the provided documents and identify what actually matters.

Write 6-10 key takeaways for: {names}

GUIDELINES:
1. A takeaway states a central conclusion or principle, not a detail
2. Scan the WHOLE material; the main points are often buried deep
3. One takeaway per line, no numbering, no preamble

Documents:
{content}

Respond with ONLY the takeaways, one per line."#;

pub const ANNOTATIONS_PROMPT: &str = r#"You are annotating course material for a study guide. Read ALL of the provided documents.

Write 6-10 margin-note annotations for: {names}

GUIDELINES:
1. An annotation points at a specific passage: a definition worth memorizing, a subtle distinction, a common point of confusion
2. Keep each annotation short and concrete
3. One annotation per line, no numbering, no preamble

Documents:
{content}

Respond with ONLY the annotations, one per line."#;

pub const EXAMPLES_PROMPT: &str = r#"You are building a study guide from course material. Read ALL of the provided documents.

Write 6-8 worked examples or illustrative scenarios for: {names}

GUIDELINES:
1. Ground every example in the documents; do not invent unrelated material
2. Analogies are welcome when the material supports them
3. One example per line, no numbering, no preamble

Documents:
{content}

Respond with ONLY the examples, one per line."#;

/// Build the generation prompt for a category.
pub fn build_prompt(kind: GenerationKind, names: &str, content: &str) -> String {
    let template = match kind {
        GenerationKind::Questions => QUESTIONS_PROMPT,
        GenerationKind::StudyNotes => STUDY_NOTES_PROMPT,
        GenerationKind::KeyTakeaways => KEY_TAKEAWAYS_PROMPT,
        GenerationKind::Annotations => ANNOTATIONS_PROMPT,
        GenerationKind::Examples => EXAMPLES_PROMPT,
    };
    template.replace("{names}", names).replace("{content}", content)
}
