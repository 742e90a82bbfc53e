//! Process-wide configuration.
//!
//! Loaded once at startup: defaults, then an optional `jgq.toml`, then
//! environment variables (a `.env` file is read first). The resulting
//! [`AppConfig`] is passed by reference to whatever needs it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{JgqError, JgqResult};
use crate::models::{ModelSelection, Role, RoleModels};

/// Default Groq OpenAI-compatible API URL.
pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";

/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "jgq.toml";

/// Default number of result rows handed to the answer model.
pub const DEFAULT_TOP_K: usize = 10;

/// Connection settings for Neo4j.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Settings for query generation and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySettings {
    /// Rows kept from a query result.
    pub top_k: usize,
    /// Check generated queries against the schema before running them.
    pub validate_cypher: bool,
    /// File holding extra generation instructions.
    pub instructions_file: Option<PathBuf>,
    /// Contents of `instructions_file`, once loaded.
    pub instructions: Option<String>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            validate_cypher: true,
            instructions_file: None,
            instructions: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub groq_api_key: Option<String>,
    pub groq_api_url: String,
    pub ollama_url: String,
    pub neo4j: Neo4jConfig,
    pub models: RoleModels,
    pub query: QuerySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_api_url: DEFAULT_GROQ_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            neo4j: Neo4jConfig::default(),
            models: RoleModels::default(),
            query: QuerySettings::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    groq: GroqSection,
    #[serde(default)]
    ollama: OllamaSection,
    #[serde(default)]
    neo4j: Neo4jSection,
    #[serde(default)]
    models: ModelsSection,
    #[serde(default)]
    query: QuerySection,
}

#[derive(Debug, Default, Deserialize)]
struct GroqSection {
    api_key: Option<String>,
    api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaSection {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Neo4jSection {
    uri: Option<String>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelsSection {
    router: Option<ModelSelection>,
    refiner: Option<ModelSelection>,
    cypher: Option<ModelSelection>,
    qa: Option<ModelSelection>,
}

#[derive(Debug, Default, Deserialize)]
struct QuerySection {
    top_k: Option<usize>,
    validate_cypher: Option<bool>,
    instructions_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// `config_path` must exist when given; otherwise `jgq.toml` in the
    /// working directory is used if present.
    pub fn load(config_path: Option<&Path>) -> JgqResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        match config_path {
            Some(path) => config.apply_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    config.apply_file(fallback)?;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.load_instructions()?;
        Ok(config)
    }

    /// Apply a TOML config file on top of the current values.
    pub fn apply_file(&mut self, path: &Path) -> JgqResult<()> {
        let text = std::fs::read_to_string(path)?;
        self.apply_toml(&text)
            .map_err(|e| JgqError::config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Applied config file");
        Ok(())
    }

    /// Apply TOML text on top of the current values.
    pub fn apply_toml(&mut self, text: &str) -> JgqResult<()> {
        let file: FileConfig =
            toml::from_str(text).map_err(|e| JgqError::config(e.to_string()))?;

        if let Some(v) = file.groq.api_key {
            self.groq_api_key = Some(v);
        }
        if let Some(v) = file.groq.api_url {
            self.groq_api_url = v;
        }
        if let Some(v) = file.ollama.url {
            self.ollama_url = v;
        }
        if let Some(v) = file.neo4j.uri {
            self.neo4j.uri = v;
        }
        if let Some(v) = file.neo4j.user {
            self.neo4j.user = v;
        }
        if let Some(v) = file.neo4j.password {
            self.neo4j.password = v;
        }
        if let Some(v) = file.neo4j.database {
            self.neo4j.database = v;
        }

        let sections = [
            (Role::Router, file.models.router),
            (Role::Refiner, file.models.refiner),
            (Role::Cypher, file.models.cypher),
            (Role::Qa, file.models.qa),
        ];
        for (role, selection) in sections {
            if let Some(sel) = selection {
                self.models.set(role, sel);
            }
        }

        if let Some(v) = file.query.top_k {
            self.query.top_k = nonzero_top_k("query.top_k", v)?;
        }
        if let Some(v) = file.query.validate_cypher {
            self.query.validate_cypher = v;
        }
        if let Some(v) = file.query.instructions_file {
            self.query.instructions_file = Some(v);
        }
        Ok(())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> JgqResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GROQ_API_KEY") {
            self.groq_api_key = Some(v);
        }
        if let Some(v) = get("GROQ_API_URL") {
            self.groq_api_url = v;
        }
        if let Some(v) = get("OLLAMA_URL") {
            self.ollama_url = v;
        }
        if let Some(v) = get("NEO4J_URL") {
            self.neo4j.uri = v;
        }
        if let Some(v) = get("NEO4J_USER") {
            self.neo4j.user = v;
        }
        if let Some(v) = get("NEO4J_PASSWORD") {
            self.neo4j.password = v;
        }
        if let Some(v) = get("NEO4J_DATABASE") {
            self.neo4j.database = v;
        }

        let model_vars = [
            (Role::Router, "JGQ_ROUTER_MODEL"),
            (Role::Refiner, "JGQ_REFINER_MODEL"),
            (Role::Cypher, "JGQ_CYPHER_MODEL"),
            (Role::Qa, "JGQ_QA_MODEL"),
        ];
        for (role, key) in model_vars {
            if let Some(v) = get(key) {
                let sel = v
                    .parse()
                    .map_err(|e| JgqError::config(format!("{}: {}", key, e)))?;
                self.models.set(role, sel);
            }
        }

        if let Some(v) = get("JGQ_TOP_K") {
            let top_k = v
                .trim()
                .parse()
                .map_err(|_| JgqError::config(format!("JGQ_TOP_K must be a number, got '{}'", v)))?;
            self.query.top_k = nonzero_top_k("JGQ_TOP_K", top_k)?;
        }
        if let Some(v) = get("JGQ_VALIDATE_CYPHER") {
            self.query.validate_cypher = parse_bool("JGQ_VALIDATE_CYPHER", &v)?;
        }
        if let Some(v) = get("JGQ_INSTRUCTIONS_FILE") {
            self.query.instructions_file = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Read the instructions file, if one is configured.
    pub fn load_instructions(&mut self) -> JgqResult<()> {
        if let Some(path) = &self.query.instructions_file {
            let text = std::fs::read_to_string(path).map_err(|e| {
                JgqError::config(format!("instructions file {}: {}", path.display(), e))
            })?;
            self.query.instructions = Some(text.trim().to_string()).filter(|t| !t.is_empty());
        }
        Ok(())
    }
}

fn nonzero_top_k(key: &str, value: usize) -> JgqResult<usize> {
    if value == 0 {
        return Err(JgqError::config(format!("{} must be at least 1", key)));
    }
    Ok(value)
}

fn parse_bool(key: &str, value: &str) -> JgqResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(JgqError::config(format!("{} must be a boolean, got '{}'", key, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.query.top_k, 10);
        assert!(config.query.validate_cypher);
        assert!(config.groq_api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup(&[
                ("GROQ_API_KEY", "gsk_test"),
                ("NEO4J_URL", "bolt://graph:7687"),
                ("NEO4J_PASSWORD", "secret"),
                ("JGQ_QA_MODEL", "ollama:codegemma:instruct"),
                ("JGQ_TOP_K", "25"),
                ("JGQ_VALIDATE_CYPHER", "off"),
            ]))
            .unwrap();

        assert_eq!(config.groq_api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.neo4j.uri, "bolt://graph:7687");
        assert_eq!(config.neo4j.password, "secret");
        assert_eq!(config.models.qa.provider, Provider::Ollama);
        assert_eq!(config.models.router, ModelSelection::default());
        assert_eq!(config.query.top_k, 25);
        assert!(!config.query.validate_cypher);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(lookup(&[("NEO4J_USER", "  ")])).unwrap();
        assert_eq!(config.neo4j.user, "neo4j");
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        let mut config = AppConfig::default();
        assert!(config.apply_env(lookup(&[("JGQ_TOP_K", "many")])).is_err());
        assert!(config.apply_env(lookup(&[("JGQ_CYPHER_MODEL", "gpt")])).is_err());
        assert!(config.apply_env(lookup(&[("JGQ_VALIDATE_CYPHER", "maybe")])).is_err());
    }

    #[test]
    fn test_toml_file() {
        let mut config = AppConfig::default();
        config
            .apply_toml(
                r#"
                [neo4j]
                uri = "neo4j://db:7687"
                database = "java"

                [models]
                cypher = "groq:gemma2-9b-it"

                [query]
                top_k = 5
                "#,
            )
            .unwrap();

        assert_eq!(config.neo4j.uri, "neo4j://db:7687");
        assert_eq!(config.neo4j.database, "java");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.models.cypher.model, "gemma2-9b-it");
        assert_eq!(config.query.top_k, 5);
    }

    #[test]
    fn test_zero_top_k_is_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(lookup(&[("JGQ_TOP_K", "0")])).unwrap_err();
        assert!(err.to_string().contains("JGQ_TOP_K must be at least 1"));
        assert!(config.apply_toml("[query]\ntop_k = 0").is_err());
        assert_eq!(config.query.top_k, 10);
    }

    #[test]
    fn test_toml_rejects_unknown_sections() {
        let mut config = AppConfig::default();
        assert!(config.apply_toml("[redis]\nurl = \"x\"").is_err());
    }

    #[test]
    fn test_env_wins_over_file() {
        let mut config = AppConfig::default();
        config.apply_toml("[neo4j]\nuser = \"file\"").unwrap();
        config.apply_env(lookup(&[("NEO4J_USER", "env")])).unwrap();
        assert_eq!(config.neo4j.user, "env");
    }

    #[test]
    fn test_missing_instructions_file() {
        let mut config = AppConfig::default();
        config.query.instructions_file = Some(PathBuf::from("/nonexistent/jgq-instructions.txt"));
        assert!(matches!(config.load_instructions(), Err(JgqError::Config(_))));
    }
}
