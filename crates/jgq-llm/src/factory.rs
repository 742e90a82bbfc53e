//! Build chat clients from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use jgq_core::{AppConfig, ChatModel, ModelSelection, Provider, Role, RoleClients, RoleModels};

use crate::groq::GroqClient;
use crate::ollama::OllamaChatClient;

/// Create a client for one model selection.
pub fn chat_model(config: &AppConfig, selection: &ModelSelection) -> Result<Arc<dyn ChatModel>> {
    match selection.provider {
        Provider::Groq => {
            let api_key = config
                .groq_api_key
                .as_deref()
                .context("GROQ_API_KEY is not set; it is required for Groq models")?;
            Ok(Arc::new(GroqClient::new(
                &config.groq_api_url,
                api_key,
                selection.clone(),
            )))
        }
        Provider::Ollama => Ok(Arc::new(OllamaChatClient::new(
            &config.ollama_url,
            selection.clone(),
        ))),
    }
}

/// Create one client per role. Roles sharing a selection share a client.
pub fn role_clients(config: &AppConfig, models: &RoleModels) -> Result<RoleClients> {
    let mut built: HashMap<ModelSelection, Arc<dyn ChatModel>> = HashMap::new();
    let mut client_for = |role: Role| -> Result<Arc<dyn ChatModel>> {
        let selection = models.get(role);
        if let Some(existing) = built.get(selection) {
            return Ok(Arc::clone(existing));
        }
        let client = chat_model(config, selection)
            .with_context(|| format!("Failed to create the {} model client", role))?;
        debug!(%role, model = %selection, "Created chat client");
        built.insert(selection.clone(), Arc::clone(&client));
        Ok(client)
    };

    Ok(RoleClients {
        router: client_for(Role::Router)?,
        refiner: client_for(Role::Refiner)?,
        cypher: client_for(Role::Cypher)?,
        qa: client_for(Role::Qa)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_requires_api_key() {
        let config = AppConfig::default();
        let err = chat_model(&config, &ModelSelection::default()).err().unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = AppConfig::default();
        let client = chat_model(&config, &ModelSelection::ollama("codegemma:instruct")).unwrap();
        assert_eq!(client.selection().model, "codegemma:instruct");
    }

    #[test]
    fn test_role_clients_share_identical_selections() {
        let config = AppConfig {
            groq_api_key: Some("gsk_test".to_string()),
            ..AppConfig::default()
        };
        let models = RoleModels::default().with_overrides(None, Some(ModelSelection::ollama("codegemma:instruct")));
        let clients = role_clients(&config, &models).unwrap();

        assert!(Arc::ptr_eq(&clients.router, &clients.cypher));
        assert!(!Arc::ptr_eq(&clients.router, &clients.qa));
        assert_eq!(clients.qa.selection().provider, Provider::Ollama);
    }
}
