//! Heuristic document analyzer.
//!
//! Extracts structural features (key terms and examples) from raw text by
//! pattern matching. Pure and deterministic: no network or AI calls happen
//! here, which makes this module the fallback content source when the
//! inference service is unreachable.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of key terms returned per document.
pub const MAX_KEY_TERMS: usize = 10;
/// Maximum number of examples returned per document.
pub const MAX_EXAMPLES: usize = 8;

/// Maximum length of a single extracted example.
const MAX_EXAMPLE_CHARS: usize = 240;

/// Structural features extracted from one document's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    pub key_terms: Vec<String>,
    pub examples: Vec<String>,
}

/// Patterns that mark key term candidates, in extraction order.
static TERM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Markdown headings: # Title
        Regex::new(r"(?m)^#{1,6}\s+(.+?)\s*$").unwrap(),
        // Bold: **term**
        Regex::new(r"\*\*([^*\n]+)\*\*").unwrap(),
        // Underline-style emphasis: __term__
        Regex::new(r"__([^_\n]+)__").unwrap(),
        // Italic: *term* (boundary guards keep this from matching inside bold)
        Regex::new(r"(?:^|\s)\*([^*\n]+)\*(?:[\s.,;:!?)]|$)").unwrap(),
        Regex::new(r"(?:^|\s)_([^_\n]+)_(?:[\s.,;:!?)]|$)").unwrap(),
        // Runs of 2-4 capitalized words: Proper Noun Phrases
        Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3})\b").unwrap(),
        // Acronyms of 3+ letters
        Regex::new(r"\b([A-Z]{3,})\b").unwrap(),
    ]
});

/// Patterns that mark example candidates.
static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:[\w+-]*\n)?(.+?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]{3,})`").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s+(.+)$").unwrap());
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*•]\s+(.+)$").unwrap());

/// Cue phrases that mark a sentence as an example or analogy.
const CUE_PHRASES: &[&str] = &["case study", " like ", "similar to", "for example", "e.g."];

/// Markers that open a step in a procedure.
const STEP_MARKERS: &[&str] = &["first", "next", "finally"];

/// Common words excluded from key terms.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "his",
        "was", "one", "our", "out", "has", "have", "been", "this", "that", "with", "from",
        "they", "them", "their", "there", "these", "those", "then", "than", "when", "where",
        "what", "which", "will", "would", "could", "should", "about", "into", "over", "also",
        "each", "other", "some", "such", "only", "most", "more", "very", "just", "both",
        "between", "because", "while", "during", "after", "before", "under", "above",
    ]
    .into_iter()
    .collect()
});

/// Extract structural features from raw document text.
///
/// Total: unparsable or empty input yields empty feature lists rather than
/// an error. Repeated calls on identical input return identical results.
pub fn analyze(raw_text: &str) -> ExtractedFeatures {
    ExtractedFeatures {
        key_terms: extract_key_terms(raw_text),
        examples: extract_examples(raw_text),
    }
}

/// Extract key term candidates from headings, emphasis spans, and
/// capitalized-word runs.
fn extract_key_terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut seen = HashSet::new();

    for pattern in TERM_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(candidate) = caps.get(1) else {
                continue;
            };
            let Some(term) = clean_term(candidate.as_str()) else {
                continue;
            };
            if seen.insert(term.to_lowercase()) {
                terms.push(term);
            }
            if terms.len() >= MAX_KEY_TERMS {
                return terms;
            }
        }
    }

    terms
}

/// Normalize a term candidate: strip markup characters and surrounding
/// punctuation, drop leading stop words, reject short or stop-word terms.
fn clean_term(raw: &str) -> Option<String> {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '_' | '`'))
        .collect();
    let trimmed = stripped.trim_matches(|c: char| !c.is_alphanumeric());

    // Drop sentence-starter stop words from capitalized runs ("The Krebs Cycle").
    let words: Vec<&str> = trimmed
        .split_whitespace()
        .skip_while(|w| STOP_WORDS.contains(w.to_lowercase().as_str()))
        .collect();
    let term = words.join(" ");

    if term.len() <= 2 || STOP_WORDS.contains(term.to_lowercase().as_str()) {
        return None;
    }
    Some(term)
}

/// Extract example candidates: code spans, cue-phrase sentences, step
/// sentences, then list items. Order matters for result composition.
fn extract_examples(text: &str) -> Vec<String> {
    let mut examples = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |candidate: &str, examples: &mut Vec<String>| -> bool {
        let cleaned = candidate.trim();
        if cleaned.len() < 3 {
            return examples.len() >= MAX_EXAMPLES;
        }
        let bounded: String = cleaned.chars().take(MAX_EXAMPLE_CHARS).collect();
        if seen.insert(bounded.clone()) {
            examples.push(bounded);
        }
        examples.len() >= MAX_EXAMPLES
    };

    for caps in FENCED_CODE.captures_iter(text) {
        if push(&caps[1], &mut examples) {
            return examples;
        }
    }
    for caps in INLINE_CODE.captures_iter(text) {
        if push(&caps[1], &mut examples) {
            return examples;
        }
    }

    for sentence in split_sentences(text) {
        let lower = sentence.to_lowercase();
        let cued = CUE_PHRASES.iter().any(|cue| lower.contains(cue));
        let stepped = STEP_MARKERS.iter().any(|marker| {
            lower
                .trim_start()
                .strip_prefix(marker)
                .is_some_and(|rest| rest.starts_with([' ', ',', ':']))
        });
        if (cued || stepped) && push(sentence, &mut examples) {
            return examples;
        }
    }

    for caps in NUMBERED_ITEM.captures_iter(text) {
        if push(&caps[1], &mut examples) {
            return examples;
        }
    }
    for caps in BULLET_ITEM.captures_iter(text) {
        if push(&caps[1], &mut examples) {
            return examples;
        }
    }

    examples
}

/// Split text into rough sentences on terminal punctuation. Line breaks
/// also act as boundaries so headings and list items stay separate.
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"# Photosynthesis

Plants convert light into energy. **Chlorophyll** absorbs photons,
similar to an antenna collecting radio waves.

## The Calvin Cycle

First, carbon dioxide is fixed. Next, ATP powers the reduction phase.
Finally, RuBP is regenerated.

1. Light-dependent reactions
2. Light-independent reactions

- Thylakoid membranes host the electron transport chain
"#;

    #[test]
    fn test_analyze_is_deterministic() {
        let a = analyze(SAMPLE);
        let b = analyze(SAMPLE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_headings_and_bold_become_key_terms() {
        let features = analyze(SAMPLE);
        assert!(features.key_terms.contains(&"Photosynthesis".to_string()));
        assert!(features.key_terms.contains(&"Chlorophyll".to_string()));
        // Leading stop word stripped from the heading run.
        assert!(features.key_terms.contains(&"Calvin Cycle".to_string()));
    }

    #[test]
    fn test_cue_and_step_sentences_become_examples() {
        let features = analyze(SAMPLE);
        assert!(features
            .examples
            .iter()
            .any(|e| e.contains("similar to an antenna")));
        assert!(features.examples.iter().any(|e| e.contains("carbon dioxide is fixed")));
    }

    #[test]
    fn test_list_items_become_examples() {
        let features = analyze(SAMPLE);
        assert!(features
            .examples
            .iter()
            .any(|e| e.contains("Light-dependent reactions")));
        assert!(features
            .examples
            .iter()
            .any(|e| e.contains("Thylakoid membranes")));
    }

    #[test]
    fn test_code_spans_become_examples() {
        let text = "Run the solver:\n```python\nsolve(x + 1)\n```\nAlso try `quick_sort(arr)` inline.";
        let features = analyze(text);
        assert!(features.examples.iter().any(|e| e.contains("solve(x + 1)")));
        assert!(features.examples.iter().any(|e| e.contains("quick_sort(arr)")));
    }

    #[test]
    fn test_bounds_respected() {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!("# Heading Number{i}\n"));
            text.push_str(&format!("{i}. item number {i}\n"));
        }
        let features = analyze(&text);
        assert!(features.key_terms.len() <= MAX_KEY_TERMS);
        assert!(features.examples.len() <= MAX_EXAMPLES);
    }

    #[test]
    fn test_plain_text_yields_empty_features() {
        let features = analyze("plain lowercase words without structure or cues at all");
        assert!(features.key_terms.is_empty());
        assert!(features.examples.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let features = analyze("");
        assert_eq!(features, ExtractedFeatures::default());
    }

    #[test]
    fn test_short_and_stop_word_terms_dropped() {
        let features = analyze("# It\n# The\n**ok** __And__");
        assert!(features.key_terms.is_empty());
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        let features = analyze("# Mitosis\n**mitosis** and **Meiosis**");
        assert_eq!(
            features.key_terms,
            vec!["Mitosis".to_string(), "Meiosis".to_string()]
        );
    }
}
