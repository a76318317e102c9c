#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;

pub mod tools;

use thiserror::Error;

use crate::backend::ArcBackend;
use crate::config::constants::SYSTEM_PROMPT;
use crate::context::HistoryWindow;
use crate::models::{ConversationTurn, GenerationPrompt};
use crate::storage::ArcLogStore;
use crate::validate::{ValidationError, validate_conversation_id, validate_message};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("generation failed: {0}")]
    Generation(eyre::Report),
}

#[derive(Debug)]
pub struct ChatReply {
    pub message: String,
    pub conversation_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Coordinates one request through the pipeline: validate, fetch the history
/// window, append the user turn, search documents, generate, append the
/// reply. Both appends are best-effort; the store and backend are injected.
pub struct RagAgent {
    store: ArcLogStore,
    window: HistoryWindow,
    backend: Option<ArcBackend>,
    model: String,
    system_prompt: String,
}

impl RagAgent {
    pub fn new(store: ArcLogStore) -> Self {
        let window = HistoryWindow::new(store.clone());
        Self {
            store,
            window,
            backend: None,
            model: String::new(),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_backend(mut self, backend: ArcBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.window = self.window.with_limit(limit);
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn chat(
        &self,
        message: &str,
        conversation_id: &str,
    ) -> Result<ChatReply, AgentError> {
        let content = validate_message(message)?;
        if !validate_conversation_id(conversation_id) {
            return Err(ValidationError::InvalidConversationId.into());
        }

        // The window excludes the turn being handled; a fresh conversation
        // formats as the no-history sentinel.
        let history = self.window.fetch(conversation_id).await;

        let user_turn = ConversationTurn::new_user(&content).with_conversation_id(conversation_id);
        persist_turn(&self.store, &user_turn).await;

        let documents = tools::search_documents(&content);

        let reply_text = match &self.backend {
            Some(backend) => {
                let prompt = GenerationPrompt::new(assemble_prompt(&history, &documents, &content))
                    .with_model(&self.model)
                    .with_system(&self.system_prompt);
                backend
                    .generate(prompt)
                    .await
                    .map_err(AgentError::Generation)?
            }
            None => fallback_reply(&content),
        };

        let assistant_turn =
            ConversationTurn::new_assistant(&reply_text).with_conversation_id(conversation_id);
        persist_turn(&self.store, &assistant_turn).await;

        Ok(ChatReply {
            message: reply_text,
            conversation_id: conversation_id.to_string(),
            timestamp: assistant_turn.created_at(),
        })
    }
}

/// Appends one turn to the log. Persistence is fire-and-forget: failures are
/// logged and reported as `false`, and the request proceeds regardless.
pub async fn persist_turn(store: &ArcLogStore, turn: &ConversationTurn) -> bool {
    match store.append_turn(turn).await {
        Ok(()) => true,
        Err(err) => {
            log::error!(
                "Error saving conversation turn for {}: {:?}",
                turn.conversation_id(),
                err
            );
            false
        }
    }
}

fn assemble_prompt(history: &str, documents: &str, message: &str) -> String {
    format!(
        "Conversation history:\n{}\n\nDocument search results:\n{}\n\nUser message: {}",
        history, documents, message
    )
}

/// Fixed reply used when no generation backend is configured. The pipeline
/// still runs end to end and records both turns.
fn fallback_reply(message: &str) -> String {
    format!(
        "RAG Agent is initializing. Your message was: '{}'. This is a basic response while the \
         full agent backend is being set up.",
        message
    )
}
