#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;

use crate::backend::{ArcBackend, Backend};
use crate::models::GenerationPrompt;
use async_trait::async_trait;
use eyre::{Context, Result, bail};
use std::collections::HashMap;

/// Owns the configured connections and routes each generation request to the
/// connection declaring the prompt's model.
#[derive(Default)]
pub struct Manager {
    connections: HashMap<String, ArcBackend>, /* Alias - Backend */
    routes: HashMap<String, String>,          /* Model ID - Alias */
}

impl Manager {
    pub fn add_connection(&mut self, connection: ArcBackend, models: &[String]) -> Result<()> {
        let alias = connection.name().to_string();

        if self.connections.contains_key(&alias) {
            bail!(format!("connection {} already exists", alias))
        }

        if models.is_empty() {
            bail!(format!("connection {} declares no models", alias))
        }

        for model in models {
            self.routes.insert(model.clone(), alias.clone());
        }
        self.connections.insert(alias, connection);
        Ok(())
    }

    pub fn get_connection(&self, model: &str) -> Option<&ArcBackend> {
        let alias = match self.routes.get(model) {
            Some(alias) => alias,
            None => return None,
        };
        self.connections.get(alias)
    }
}

#[async_trait]
impl Backend for Manager {
    fn name(&self) -> &str {
        "Manager"
    }

    async fn health_check(&self) -> Result<()> {
        for (alias, connection) in &self.connections {
            connection
                .health_check()
                .await
                .wrap_err(format!("health check backend {}", alias))?;
        }
        Ok(())
    }

    async fn generate(&self, prompt: GenerationPrompt) -> Result<String> {
        let connection = match self.get_connection(prompt.model()) {
            Some(connection) => connection,
            None => {
                return Err(eyre::eyre!("model {} is not available", prompt.model()));
            }
        };
        let text = connection
            .generate(prompt)
            .await
            .wrap_err(format!("generating from backend {}", connection.name()))?;
        Ok(text)
    }
}
