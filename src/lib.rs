//! Studyforge - AI-assisted study guide synthesis.
//!
//! Turns a set of documents into structured study content: a heuristic
//! analyzer extracts key terms and examples from raw text, an inference
//! gateway asks a locally-hosted language model for notes, questions,
//! examples, and takeaways, and a synthesis orchestrator merges everything
//! into ordered study guide sections. Whenever the inference service is
//! unavailable or returns unusable output, deterministic fallback content
//! keeps the guide complete.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod synthesis;
