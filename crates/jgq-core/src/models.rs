//! LLM providers, model selections and the per-role model assignment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JgqError, JgqResult};

/// Sampling temperature used for every role. Fixed for deterministic output.
pub const TEMPERATURE: f32 = 0.0;

/// Default model for every role.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Chat-completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::Ollama => "ollama",
        }
    }

    /// Human-readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::Ollama => "Ollama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = JgqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "ollama" => Ok(Provider::Ollama),
            other => Err(JgqError::UnknownProvider(other.to_string())),
        }
    }
}

/// A provider plus a model name on that provider.
///
/// Written as `provider:model`. Only the first colon separates the two, so
/// Ollama tags such as `ollama:codegemma:instruct` parse as expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelSelection {
    pub provider: Provider,
    pub model: String,
}

impl ModelSelection {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn groq(model: impl Into<String>) -> Self {
        Self::new(Provider::Groq, model)
    }

    pub fn ollama(model: impl Into<String>) -> Self {
        Self::new(Provider::Ollama, model)
    }

    /// Label used in selection lists, e.g. `Groq: llama3-70b-8192`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.provider.display_name(), self.model)
    }
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self::groq(DEFAULT_MODEL)
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

impl FromStr for ModelSelection {
    type Err = JgqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s.trim().split_once(':').ok_or_else(|| {
            JgqError::config(format!(
                "model selection '{}' must be written as provider:model",
                s
            ))
        })?;
        let model = model.trim();
        if model.is_empty() {
            return Err(JgqError::config(format!("model selection '{}' has no model name", s)));
        }
        Ok(Self::new(provider.parse()?, model))
    }
}

impl TryFrom<String> for ModelSelection {
    type Error = JgqError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelSelection> for String {
    fn from(value: ModelSelection) -> Self {
        value.to_string()
    }
}

/// Models offered for selection in the UI and listed by `jgq models`.
pub fn model_catalog() -> Vec<ModelSelection> {
    vec![
        ModelSelection::groq("llama3-70b-8192"),
        ModelSelection::groq("mixtral-8x7b-32768"),
        ModelSelection::groq("gemma2-9b-it"),
        ModelSelection::groq("llama3-groq-70b-8192-tool-use-preview"),
        ModelSelection::ollama("codegemma:instruct"),
    ]
}

/// The job a model performs in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Router,
    Refiner,
    Cypher,
    Qa,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Router, Role::Refiner, Role::Cypher, Role::Qa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Router => "router",
            Role::Refiner => "refiner",
            Role::Cypher => "cypher",
            Role::Qa => "qa",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model selection for each role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleModels {
    pub router: ModelSelection,
    pub refiner: ModelSelection,
    pub cypher: ModelSelection,
    pub qa: ModelSelection,
}

impl RoleModels {
    pub fn get(&self, role: Role) -> &ModelSelection {
        match role {
            Role::Router => &self.router,
            Role::Refiner => &self.refiner,
            Role::Cypher => &self.cypher,
            Role::Qa => &self.qa,
        }
    }

    pub fn set(&mut self, role: Role, selection: ModelSelection) {
        match role {
            Role::Router => self.router = selection,
            Role::Refiner => self.refiner = selection,
            Role::Cypher => self.cypher = selection,
            Role::Qa => self.qa = selection,
        }
    }

    /// Return a copy with the given overrides applied.
    pub fn with_overrides(
        &self,
        cypher: Option<ModelSelection>,
        qa: Option<ModelSelection>,
    ) -> Self {
        let mut models = self.clone();
        if let Some(sel) = cypher {
            models.cypher = sel;
        }
        if let Some(sel) = qa {
            models.qa = sel;
        }
        models
    }
}
