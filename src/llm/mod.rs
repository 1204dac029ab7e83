//! Inference gateway: connectivity, model selection, generation dispatch,
//! response caching, and deterministic fallback content.

mod cache;
mod client;
mod config;
pub mod fallback;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use cache::ResponseCache;
pub use client::{ConnectionStatus, InferenceClient, ModelDescriptor};
pub use config::InferenceConfig;

/// Study content category for a generation request.
///
/// The category travels alongside the prompt so fallback selection is an
/// explicit contract rather than substring matching on prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Questions,
    StudyNotes,
    KeyTakeaways,
    Annotations,
    Examples,
}

impl GenerationKind {
    /// All categories, in fan-out order.
    pub const ALL: [GenerationKind; 5] = [
        GenerationKind::Questions,
        GenerationKind::StudyNotes,
        GenerationKind::KeyTakeaways,
        GenerationKind::Annotations,
        GenerationKind::Examples,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Questions => "questions",
            Self::StudyNotes => "study_notes",
            Self::KeyTakeaways => "key_takeaways",
            Self::Annotations => "annotations",
            Self::Examples => "examples",
        }
    }
}

/// Errors that can occur during inference operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Failed to reach the inference service.
    #[error("connection error: {0}")]
    Connection(String),
    /// The call exceeded its bounded timeout.
    #[error("request timed out")]
    Timeout,
    /// The service answered with an error.
    #[error("API error: {0}")]
    Api(String),
    /// The response body was unusable.
    #[error("parse error: {0}")]
    Parse(String),
    /// No successful `connect` has happened.
    #[error("not connected to inference service")]
    NotConnected,
    /// The service reports no usable model.
    #[error("no model available")]
    NoModel,
    /// Generation is disabled by configuration.
    #[error("inference is disabled")]
    Disabled,
}

/// Seam between the orchestrator and the inference service.
///
/// The orchestrator talks to this trait so failure policies can be tested
/// without a live service.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Whether generation calls can be attempted at all.
    fn is_connected(&self) -> bool;

    /// Generate text for a category, surfacing failures.
    async fn try_generate(&self, kind: GenerationKind, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl GenerationBackend for InferenceClient {
    fn is_connected(&self) -> bool {
        InferenceClient::is_connected(self)
    }

    async fn try_generate(&self, kind: GenerationKind, prompt: &str) -> Result<String, LlmError> {
        InferenceClient::try_generate(self, kind, prompt).await
    }
}
