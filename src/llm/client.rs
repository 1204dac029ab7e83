//! Inference gateway client.
//!
//! Talks to a local Ollama-compatible inference service: probes
//! connectivity, discovers and selects a model, dispatches generation
//! requests (streaming and non-streaming) with bounded timeouts, and caches
//! responses. Generation fails closed: the public `generate` surface always
//! returns usable text, degrading to deterministic fallback content.

use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cache::ResponseCache;
use super::config::InferenceConfig;
use super::fallback;
use super::{GenerationKind, LlmError};

/// Connection state of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

/// A model reported by the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name as the service reports it (e.g. `llama3.2:3b`).
    pub name: String,
    /// Stable identifier (content digest when the service provides one).
    pub id: String,
    /// On-disk size in bytes.
    pub size_bytes: u64,
    /// Last modification time reported by the service.
    pub modified_at: Option<DateTime<Utc>>,
    /// Whether the model can be used for generation.
    pub available: bool,
}

/// Generation request wire format.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

/// Non-streaming generation response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

/// One newline-delimited chunk of a streaming response.
#[derive(Debug, Default, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: Option<bool>,
}

/// Model list wire format.
#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Deserialize)]
struct TagsModel {
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    modified_at: Option<String>,
}

/// Mutable connection state, written only by `connect`.
#[derive(Debug, Default)]
struct GatewayState {
    status: ConnectionStatus,
    models: Vec<ModelDescriptor>,
    current_model: Option<String>,
}

/// Client for the local inference service.
pub struct InferenceClient {
    config: InferenceConfig,
    client: Client,
    state: RwLock<GatewayState>,
    cache: ResponseCache,
}

impl InferenceClient {
    /// Create a new client. No network traffic happens until `connect`.
    pub fn new(config: InferenceConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        let cache = ResponseCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_max_entries,
        );

        Self {
            config,
            client,
            state: RwLock::new(GatewayState::default()),
            cache,
        }
    }

    /// Get the config.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.state
            .read()
            .map(|s| s.status)
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    /// Whether the last `connect` succeeded.
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Models discovered at connect time.
    pub fn models(&self) -> Vec<ModelDescriptor> {
        self.state.read().map(|s| s.models.clone()).unwrap_or_default()
    }

    /// The selected model, if any.
    pub fn current_model(&self) -> Option<String> {
        self.state.read().ok().and_then(|s| s.current_model.clone())
    }

    /// Response cache statistics: (entries, hits).
    pub fn cache_stats(&self) -> (usize, u64) {
        (self.cache.len(), self.cache.hits())
    }

    /// Probe the inference service and discover models.
    ///
    /// On success, selects `current_model` from the configured preference
    /// list (first match wins), falling back to the first available model.
    /// Returns whether the gateway is now connected. Failure is not
    /// retried here; re-probing is the caller's decision.
    pub async fn connect(&self) -> bool {
        if !self.config.enabled {
            self.set_status(ConnectionStatus::Disconnected);
            return false;
        }
        self.set_status(ConnectionStatus::Connecting);

        let url = format!("{}/api/tags", self.config.endpoint);
        let probe = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await;
        match probe {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                warn!("Inference probe failed: HTTP {}", resp.status());
                self.set_status(ConnectionStatus::Error);
                return false;
            }
            Err(e) => {
                warn!("Inference service unreachable: {}", e);
                self.set_status(ConnectionStatus::Error);
                return false;
            }
        }

        let models = match self.fetch_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("Model discovery failed: {}", e);
                self.set_status(ConnectionStatus::Error);
                return false;
            }
        };

        let current = self
            .config
            .model
            .clone()
            .or_else(|| select_model(&models, &self.config.preferred_models));

        match current {
            Some(model) => {
                info!(
                    "Connected to inference service at {} (model: {}, {} available)",
                    self.config.endpoint,
                    model,
                    models.len()
                );
                if let Ok(mut state) = self.state.write() {
                    state.status = ConnectionStatus::Connected;
                    state.models = models;
                    state.current_model = Some(model);
                }
                true
            }
            None => {
                warn!("Inference service reports no models");
                self.set_status(ConnectionStatus::Error);
                false
            }
        }
    }

    /// List models from the inference service.
    pub async fn fetch_models(&self) -> Result<Vec<ModelDescriptor>, LlmError> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.model_list_timeout_secs))
            .send()
            .await
            .map_err(classify)?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("HTTP {}", resp.status())));
        }

        let tags: TagsResponse = resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelDescriptor {
                id: m.digest.unwrap_or_else(|| m.name.clone()),
                size_bytes: m.size.unwrap_or(0),
                modified_at: m
                    .modified_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
                available: true,
                name: m.name,
            })
            .collect())
    }

    /// Generate text for a category, failing closed.
    ///
    /// Never returns an error: any network, timeout, or parse failure is
    /// absorbed and replaced by the category's deterministic fallback text.
    pub async fn generate(&self, kind: GenerationKind, prompt: &str) -> String {
        match self.try_generate(kind, prompt).await {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    category = kind.as_str(),
                    error = %e,
                    "generation failed, serving fallback content"
                );
                fallback::fallback_text(kind)
            }
        }
    }

    /// Generate text for a category, surfacing failures to the caller.
    ///
    /// The response cache is consulted first; a hit younger than the TTL
    /// short-circuits the network call entirely.
    pub async fn try_generate(
        &self,
        kind: GenerationKind,
        prompt: &str,
    ) -> Result<String, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }
        let model = {
            let state = self.state.read().map_err(|_| LlmError::NotConnected)?;
            if state.status != ConnectionStatus::Connected {
                return Err(LlmError::NotConnected);
            }
            state.current_model.clone().ok_or(LlmError::NoModel)?
        };

        let key = ResponseCache::key(&model, prompt, self.config.max_tokens);
        if let Some(hit) = self.cache.get(&key) {
            debug!(category = kind.as_str(), "response cache hit");
            return Ok(hit);
        }

        debug!(category = kind.as_str(), model = %model, "dispatching generation");
        let raw = if self.config.stream {
            self.generate_streaming(&model, prompt).await?
        } else {
            self.generate_once(&model, prompt).await?
        };

        let text = raw.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::Parse("empty generation response".to_string()));
        }

        self.cache.insert(key, text.clone());
        Ok(text)
    }

    /// Single-shot (non-streaming) generation call.
    async fn generate_once(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: self.options(),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.generate_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateResponse =
            resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(parsed.response)
    }

    /// Streaming generation call.
    ///
    /// Reassembles newline-delimited JSON chunks, accumulating `response`
    /// fragments until a chunk reports `done`. Malformed lines are skipped.
    async fn generate_streaming(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: true,
            options: self.options(),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.generate_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("HTTP {}", resp.status())));
        }

        let mut stream = resp.bytes_stream();
        let mut buffer = String::new();
        let mut output = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(classify)?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim().to_string();
                buffer.drain(..=newline);
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<StreamChunk>(&line) {
                    Ok(chunk) => {
                        if let Some(fragment) = chunk.response {
                            output.push_str(&fragment);
                        }
                        if chunk.done == Some(true) {
                            return Ok(output);
                        }
                    }
                    Err(e) => debug!("Skipping malformed stream line: {}", e),
                }
            }
        }

        // Stream ended without a done flag; flush whatever is left.
        let tail = buffer.trim();
        if !tail.is_empty() {
            if let Ok(chunk) = serde_json::from_str::<StreamChunk>(tail) {
                if let Some(fragment) = chunk.response {
                    output.push_str(&fragment);
                }
            }
        }
        Ok(output)
    }

    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            num_predict: self.config.max_tokens,
            stop: Vec::new(),
        }
    }

    fn set_status(&self, status: ConnectionStatus) {
        if let Ok(mut state) = self.state.write() {
            state.status = status;
        }
    }
}

/// Classify a transport error.
fn classify(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Connection(e.to_string())
    }
}

/// Select a model by preference order; first match wins, otherwise the
/// first available model. A preference matches a model exactly or as the
/// base name of a tagged variant (`llama3.2` matches `llama3.2:3b`).
fn select_model(models: &[ModelDescriptor], preferred: &[String]) -> Option<String> {
    for pref in preferred {
        let found = models.iter().find(|m| {
            m.available && (m.name == *pref || m.name.starts_with(&format!("{pref}:")))
        });
        if let Some(m) = found {
            return Some(m.name.clone());
        }
    }
    models.iter().find(|m| m.available).map(|m| m.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ModelDescriptor {
        ModelDescriptor {
            name: name.to_string(),
            id: name.to_string(),
            size_bytes: 0,
            modified_at: None,
            available: true,
        }
    }

    #[test]
    fn test_select_model_preference_order() {
        let models = vec![descriptor("qwen2:7b"), descriptor("llama3.2:3b")];
        let prefs = vec!["llama3.2:3b".to_string(), "qwen2:7b".to_string()];
        assert_eq!(select_model(&models, &prefs).as_deref(), Some("llama3.2:3b"));
    }

    #[test]
    fn test_select_model_matches_tagged_variant() {
        let models = vec![descriptor("llama3.2:1b-instruct")];
        let prefs = vec!["llama3.2".to_string()];
        assert_eq!(
            select_model(&models, &prefs).as_deref(),
            Some("llama3.2:1b-instruct")
        );
    }

    #[test]
    fn test_select_model_falls_back_to_first_available() {
        let models = vec![descriptor("some-unknown:latest"), descriptor("other")];
        let prefs = vec!["llama3.2".to_string()];
        assert_eq!(
            select_model(&models, &prefs).as_deref(),
            Some("some-unknown:latest")
        );
    }

    #[test]
    fn test_select_model_empty_list() {
        assert_eq!(select_model(&[], &["llama3.2".to_string()]), None);
    }

    #[test]
    fn test_initial_status_is_disconnected() {
        let client = InferenceClient::new(InferenceConfig::default());
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert!(!client.is_connected());
        assert!(client.current_model().is_none());
    }

    #[tokio::test]
    async fn test_generate_fails_closed_when_disconnected() {
        let client = InferenceClient::new(InferenceConfig::default());
        let err = client
            .try_generate(GenerationKind::Questions, "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NotConnected));

        // The infallible surface degrades to fallback content instead.
        let text = client.generate(GenerationKind::Questions, "prompt").await;
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_config_short_circuits() {
        let config = InferenceConfig {
            enabled: false,
            ..Default::default()
        };
        let client = InferenceClient::new(config);
        assert!(!client.connect().await);
        let err = client
            .try_generate(GenerationKind::Examples, "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Disabled));
    }
}
