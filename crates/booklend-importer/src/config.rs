//! Configuration for the document extraction service.

use serde::{Deserialize, Serialize};

/// Where and how to reach the roster extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorConfig {
    /// Endpoint URL. Empty disables document import.
    pub endpoint: String,
    /// Environment variable holding the API key, if the service needs one.
    pub api_key_env: Option<String>,
    /// Model name passed through to the service.
    pub model: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: Some("BOOKLEND_EXTRACTOR_KEY".to_string()),
            model: None,
        }
    }
}

impl ExtractorConfig {
    /// Configuration for an endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the API key variable.
    #[must_use]
    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Set the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether an endpoint is set.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    /// Read the API key from the configured variable.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref()?;
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = ExtractorConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(
            config.api_key_env.as_deref(),
            Some("BOOKLEND_EXTRACTOR_KEY")
        );
    }

    #[test]
    fn test_builder() {
        let config = ExtractorConfig::new("http://localhost:8080/extract")
            .api_key_env("MY_KEY")
            .model("vision-small");
        assert!(config.is_enabled());
        assert_eq!(config.model.as_deref(), Some("vision-small"));
        assert_eq!(config.api_key_env.as_deref(), Some("MY_KEY"));
    }

    #[test]
    fn test_partial_json() {
        let config: ExtractorConfig =
            serde_json::from_str(r#"{"endpoint":"http://x/extract"}"#).unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.model, None);
        assert!(config.api_key_env.is_some());
    }

    #[test]
    fn test_missing_key_variable() {
        let config = ExtractorConfig::new("http://x").api_key_env("BOOKLEND_TEST_UNSET_VARIABLE");
        assert_eq!(config.api_key(), None);
    }
}
