//! Inference gateway configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the inference gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Whether AI generation is enabled at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Inference service endpoint (default: http://localhost:11434)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Explicit model override. When unset, the gateway selects from
    /// `preferred_models` among the models the service reports.
    #[serde(default)]
    pub model: Option<String>,
    /// Preference order for model selection; first match wins.
    #[serde(default = "default_preferred_models")]
    pub preferred_models: Vec<String>,
    /// Maximum tokens in a generated response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Request streamed responses and reassemble them client-side.
    #[serde(default)]
    pub stream: bool,
    /// Timeout for the connectivity probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Timeout for fetching the model list, in seconds.
    #[serde(default = "default_model_list_timeout")]
    pub model_list_timeout_secs: u64,
    /// Timeout for a single generation call, in seconds.
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,
    /// Time-to-live for cached responses, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Maximum number of cached responses kept at once.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_preferred_models() -> Vec<String> {
    [
        "llama3.2:3b",
        "llama3.2:1b",
        "llama3.2",
        "phi3:mini",
        "mistral:7b",
        "gemma2:2b",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f32 {
    0.3
}
fn default_top_p() -> f32 {
    0.9
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_model_list_timeout() -> u64 {
    10
}
fn default_generate_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    300
}
fn default_cache_max_entries() -> usize {
    256
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: None,
            preferred_models: default_preferred_models(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            stream: false,
            probe_timeout_secs: default_probe_timeout(),
            model_list_timeout_secs: default_model_list_timeout(),
            generate_timeout_secs: default_generate_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl InferenceConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `STUDYFORGE_ENABLED`: "true" or "false"
    /// - `STUDYFORGE_ENDPOINT`: inference service base URL
    /// - `STUDYFORGE_MODEL`: explicit model name
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(enabled) = std::env::var("STUDYFORGE_ENABLED") {
            self.enabled = enabled.eq_ignore_ascii_case("true") || enabled == "1";
        }
        if let Ok(endpoint) = std::env::var("STUDYFORGE_ENDPOINT") {
            if !endpoint.is_empty() {
                self.endpoint = endpoint;
            }
        }
        if let Ok(model) = std::env::var("STUDYFORGE_MODEL") {
            if !model.is_empty() {
                self.model = Some(model);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert!(config.enabled);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert!(config.model.is_none());
        assert!(!config.preferred_models.is_empty());
        assert_eq!(config.cache_ttl_secs, 300);
    }

    #[test]
    fn test_builder_overrides() {
        let config = InferenceConfig::default()
            .with_endpoint("http://10.0.0.2:11434")
            .with_model("llama3.2:3b");
        assert_eq!(config.endpoint, "http://10.0.0.2:11434");
        assert_eq!(config.model.as_deref(), Some("llama3.2:3b"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: InferenceConfig =
            toml::from_str("endpoint = \"http://box:11434\"").unwrap();
        assert_eq!(config.endpoint, "http://box:11434");
        assert_eq!(config.max_tokens, 512);
        assert!(config.enabled);
    }
}
