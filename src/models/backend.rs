use serde::{Deserialize, Serialize};
use std::{fmt::Display, time};

/// Input handed to the generation step. The formatted history window and the
/// placeholder document excerpts travel inside `text`; the generation output
/// is consumed as an opaque string.
pub struct GenerationPrompt {
    model: String,
    system: String,
    text: String,
}

impl GenerationPrompt {
    pub fn new(text: impl Into<String>) -> GenerationPrompt {
        GenerationPrompt {
            model: String::new(),
            system: String::new(),
            text: text.into(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_system(mut self, system: &str) -> Self {
        self.system = system.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    #[serde(rename = "openai")]
    OpenAI,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BackendConnection {
    #[serde(default)]
    enabled: bool,
    kind: BackendKind,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    timeout: Option<time::Duration>,
    #[serde(default)]
    models: Vec<String>,

    #[serde(default)]
    max_output_tokens: Option<usize>,
}

impl BackendConnection {
    pub fn new(kind: BackendKind, endpoint: impl Into<String>) -> Self {
        Self {
            enabled: false,
            kind,
            alias: None,
            endpoint: endpoint.into(),
            api_key: None,
            timeout: None,
            models: Vec::new(),
            max_output_tokens: None,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Option<time::Duration> {
        self.timeout
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn max_output_tokens(&self) -> Option<usize> {
        self.max_output_tokens
    }
}
