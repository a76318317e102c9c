pub mod manager;
pub mod openai;

pub use manager::Manager;
pub use openai::OpenAI;

#[cfg(test)]
use mockall::automock;

use crate::{
    config::BackendConfig,
    models::{BackendKind, GenerationPrompt},
};
use async_trait::async_trait;
use eyre::{Context, Result};
use std::{sync::Arc, time::Duration};

/// The generation step. Input is an assembled prompt; output is an opaque
/// string that is never parsed further.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backend {
    fn name(&self) -> &str;
    async fn health_check(&self) -> Result<()>;
    async fn generate(&self, prompt: GenerationPrompt) -> Result<String>;
}

pub type ArcBackend = Arc<dyn Backend + Send + Sync>;

/// Builds the connection manager from configuration. Returns `None` when no
/// connection is enabled; the agent then falls back to its fixed reply
/// instead of calling out.
pub async fn new_backend(config: &BackendConfig) -> Result<Option<ArcBackend>> {
    let connections = config
        .connections
        .iter()
        .filter(|c| c.enabled())
        .collect::<Vec<_>>();
    if connections.is_empty() {
        return Ok(None);
    }

    let default_timeout = config.timeout_secs.map(|t| Duration::from_secs(t as u64));

    let mut manager = Manager::default();
    for connection in connections {
        let backend: ArcBackend = match connection.kind() {
            BackendKind::OpenAI => {
                let mut connection = connection.clone();
                if connection.timeout().is_none() && default_timeout.is_some() {
                    connection = connection.with_timeout(default_timeout.unwrap());
                }
                let openai: OpenAI = (&connection).into();
                Arc::new(openai)
            }
        };

        let name = backend.name().to_string();
        manager
            .add_connection(backend, connection.models())
            .wrap_err(format!("adding connection: {}", name))?;
        log::debug!("Added backend connection: {}", name);
    }
    Ok(Some(Arc::new(manager)))
}
