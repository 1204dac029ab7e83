//! Synthesis orchestrator.
//!
//! Consumes analyzer features and gateway generation calls: fans out one
//! generation request per content category, merges per-document results,
//! deduplicates, and assembles ordered study guide sections. Results are
//! cached by document-set fingerprint so the same upload never pays for
//! synthesis twice in one process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::analyzer::{self, ExtractedFeatures};
use crate::llm::{fallback, prompts, GenerationBackend, GenerationKind, LlmError};
use crate::models::{fingerprint, CombinedAnalysis, Document, DocumentAnalysis, StudyGuideSection};

use super::postprocess::{
    clean_lines, dedup_preserving, document_section, overview_section, slice_window,
    union_analyses,
};

/// What happens to the fan-out when one category's generation call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Each failed category independently falls back to heuristic content;
    /// successful categories keep their AI output.
    #[default]
    PerCategory,
    /// One failure reverts every category to fallback content for the run.
    AllOrNothing,
}

/// Orchestrator tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Content lines each document receives per category.
    #[serde(default = "default_per_document_lines")]
    pub per_document_lines: usize,
    /// Upper bound on processed lines per category.
    #[serde(default = "default_max_category_lines")]
    pub max_category_lines: usize,
    /// Length of the raw-content preview stored on each section.
    #[serde(default = "default_content_preview_chars")]
    pub content_preview_chars: usize,
    /// Characters of each document's text included in the combined prompt.
    #[serde(default = "default_max_chars_per_document")]
    pub max_chars_per_document: usize,
    /// Fan-out failure policy.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_per_document_lines() -> usize {
    2
}
fn default_max_category_lines() -> usize {
    10
}
fn default_content_preview_chars() -> usize {
    800
}
fn default_max_chars_per_document() -> usize {
    4000
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            per_document_lines: default_per_document_lines(),
            max_category_lines: default_max_category_lines(),
            content_preview_chars: default_content_preview_chars(),
            max_chars_per_document: default_max_chars_per_document(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Phase of a synthesis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisPhase {
    Analyzing,
    AiFanout,
    Fallback,
    Merging,
    Complete,
}

impl SynthesisPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::AiFanout => "ai-fanout",
            Self::Fallback => "fallback",
            Self::Merging => "merging",
            Self::Complete => "complete",
        }
    }
}

/// Events emitted during a synthesis run.
#[derive(Debug, Clone)]
pub enum SynthesisEvent {
    /// Synthesis started for a document set.
    Started { documents: usize },
    /// The run moved to a new phase.
    Phase { phase: SynthesisPhase },
    /// The document set was served from the result cache.
    CacheHit,
    /// One category's content is ready.
    CategoryCompleted {
        kind: GenerationKind,
        lines: usize,
        fell_back: bool,
    },
    /// Synthesis finished.
    Complete { sections: usize },
}

/// Result of one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    pub analysis: CombinedAnalysis,
    pub sections: Vec<StudyGuideSection>,
}

/// Errors that cross the synthesis boundary.
///
/// Everything else (connectivity, per-call generation failures) is absorbed
/// and replaced with deterministic fallback content.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("no documents to synthesize")]
    NoDocuments,
}

/// Service that turns document sets into study guides.
pub struct SynthesisService {
    backend: Arc<dyn GenerationBackend>,
    config: SynthesisConfig,
    result_cache: RwLock<HashMap<String, SynthesisOutcome>>,
}

impl SynthesisService {
    /// Create a new synthesis service over a generation backend.
    pub fn new(backend: Arc<dyn GenerationBackend>, config: SynthesisConfig) -> Self {
        Self {
            backend,
            config,
            result_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached synthesis results.
    pub fn cached_results(&self) -> usize {
        self.result_cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Synthesize a study guide without progress reporting.
    pub async fn synthesize(
        &self,
        documents: &[Document],
    ) -> Result<SynthesisOutcome, SynthesisError> {
        let (event_tx, _event_rx) = mpsc::channel(16);
        self.synthesize_with_events(documents, event_tx).await
    }

    /// Synthesize a study guide, emitting progress events.
    pub async fn synthesize_with_events(
        &self,
        documents: &[Document],
        event_tx: mpsc::Sender<SynthesisEvent>,
    ) -> Result<SynthesisOutcome, SynthesisError> {
        if documents.is_empty() {
            return Err(SynthesisError::NoDocuments);
        }

        let print = fingerprint(documents);
        if let Some(cached) = self
            .result_cache
            .read()
            .ok()
            .and_then(|cache| cache.get(&print).cloned())
        {
            debug!("Result cache hit for {} document(s)", documents.len());
            let _ = event_tx.send(SynthesisEvent::CacheHit).await;
            let _ = event_tx
                .send(SynthesisEvent::Complete {
                    sections: cached.sections.len(),
                })
                .await;
            return Ok(cached);
        }

        let _ = event_tx
            .send(SynthesisEvent::Started {
                documents: documents.len(),
            })
            .await;
        let _ = event_tx
            .send(SynthesisEvent::Phase {
                phase: SynthesisPhase::Analyzing,
            })
            .await;

        let features: Vec<ExtractedFeatures> = documents
            .iter()
            .map(|d| analyzer::analyze(&d.raw_text))
            .collect();

        let names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
        let names_joined = names.join(", ");
        let body = self.combined_body(documents, &features);

        let connected = self.backend.is_connected();
        let _ = event_tx
            .send(SynthesisEvent::Phase {
                phase: if connected {
                    SynthesisPhase::AiFanout
                } else {
                    SynthesisPhase::Fallback
                },
            })
            .await;

        let category_lines = self
            .generate_categories(connected, &names_joined, &body, &event_tx)
            .await;
        let [questions, study_notes, key_takeaways, annotations, example_lines] = category_lines;

        let _ = event_tx
            .send(SynthesisEvent::Phase {
                phase: SynthesisPhase::Merging,
            })
            .await;

        let per_doc = self.config.per_document_lines;
        let analyses: Vec<DocumentAnalysis> = documents
            .iter()
            .enumerate()
            .map(|(i, _)| DocumentAnalysis {
                key_terms: features[i].key_terms.clone(),
                examples: dedup_preserving(
                    features[i]
                        .examples
                        .iter()
                        .cloned()
                        .chain(slice_window(&example_lines, i, per_doc)),
                )
                .into_iter()
                .take(analyzer::MAX_EXAMPLES)
                .collect(),
                questions: slice_window(&questions, i, per_doc),
                study_notes: slice_window(&study_notes, i, per_doc),
                key_takeaways: slice_window(&key_takeaways, i, per_doc),
                annotations: slice_window(&annotations, i, per_doc),
            })
            .collect();

        let marked_document = documents
            .iter()
            .map(|d| d.raw_text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");
        let combined = union_analyses(&analyses, marked_document);

        let mut sections: Vec<StudyGuideSection> = documents
            .iter()
            .zip(analyses.iter())
            .map(|(doc, analysis)| {
                document_section(doc, analysis, self.config.content_preview_chars)
            })
            .collect();
        if documents.len() > 1 {
            sections.insert(0, overview_section(&combined, &names));
        }

        let outcome = SynthesisOutcome {
            analysis: combined,
            sections,
        };

        if let Ok(mut cache) = self.result_cache.write() {
            cache.insert(print, outcome.clone());
        }

        info!(
            "Synthesized {} section(s) from {} document(s)",
            outcome.sections.len(),
            documents.len()
        );
        let _ = event_tx
            .send(SynthesisEvent::Phase {
                phase: SynthesisPhase::Complete,
            })
            .await;
        let _ = event_tx
            .send(SynthesisEvent::Complete {
                sections: outcome.sections.len(),
            })
            .await;

        Ok(outcome)
    }

    /// Build the combined prompt body: every document's bounded text plus
    /// its extracted key terms and examples.
    fn combined_body(&self, documents: &[Document], features: &[ExtractedFeatures]) -> String {
        documents
            .iter()
            .zip(features.iter())
            .map(|(doc, feats)| {
                let text: String = doc
                    .raw_text
                    .chars()
                    .take(self.config.max_chars_per_document)
                    .collect();
                let mut block = format!("=== {} ===\n{}", doc.name, text);
                if !feats.key_terms.is_empty() {
                    block.push_str(&format!("\nKey terms: {}", feats.key_terms.join(", ")));
                }
                if !feats.examples.is_empty() {
                    block.push_str(&format!("\nExamples: {}", feats.examples.join("; ")));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Run the five-way category fan-out and post-process each response.
    ///
    /// Returns one processed line list per category, in `GenerationKind::ALL`
    /// order. Failed or empty categories are substituted with deterministic
    /// fallback lines according to the failure policy.
    async fn generate_categories(
        &self,
        connected: bool,
        names: &str,
        body: &str,
        event_tx: &mpsc::Sender<SynthesisEvent>,
    ) -> [Vec<String>; 5] {
        let mut results: Vec<Result<String, LlmError>> = if connected {
            let prompt = |kind| prompts::build_prompt(kind, names, body);
            let questions_prompt = prompt(GenerationKind::Questions);
            let notes_prompt = prompt(GenerationKind::StudyNotes);
            let takeaways_prompt = prompt(GenerationKind::KeyTakeaways);
            let annotations_prompt = prompt(GenerationKind::Annotations);
            let examples_prompt = prompt(GenerationKind::Examples);
            let (questions, notes, takeaways, annotations, examples) = tokio::join!(
                self.backend
                    .try_generate(GenerationKind::Questions, &questions_prompt),
                self.backend
                    .try_generate(GenerationKind::StudyNotes, &notes_prompt),
                self.backend
                    .try_generate(GenerationKind::KeyTakeaways, &takeaways_prompt),
                self.backend
                    .try_generate(GenerationKind::Annotations, &annotations_prompt),
                self.backend
                    .try_generate(GenerationKind::Examples, &examples_prompt),
            );
            vec![questions, notes, takeaways, annotations, examples]
        } else {
            GenerationKind::ALL
                .iter()
                .map(|_| Err(LlmError::NotConnected))
                .collect()
        };

        // Under the all-or-nothing policy one rejection poisons the batch.
        if self.config.failure_policy == FailurePolicy::AllOrNothing
            && results.iter().any(|r| r.is_err())
        {
            debug!("Fan-out failed; reverting every category to fallback");
            results = GenerationKind::ALL
                .iter()
                .map(|_| Err(LlmError::NotConnected))
                .collect();
        }

        let mut lines: [Vec<String>; 5] = Default::default();
        for ((kind, result), slot) in GenerationKind::ALL.into_iter().zip(results).zip(&mut lines)
        {
            let (processed, fell_back) = match result {
                Ok(raw) => {
                    let cleaned = clean_lines(&raw, self.config.max_category_lines);
                    if cleaned.is_empty() {
                        (fallback::fallback_lines(kind, names), true)
                    } else {
                        (cleaned, false)
                    }
                }
                Err(_) => (fallback::fallback_lines(kind, names), true),
            };
            let _ = event_tx
                .send(SynthesisEvent::CategoryCompleted {
                    kind,
                    lines: processed.len(),
                    fell_back,
                })
                .await;
            *slot = processed;
        }
        lines
    }
}
