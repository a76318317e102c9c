#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use eyre::{Context, Result};

use crate::config::constants::DEFAULT_HISTORY_LIMIT;
use crate::models::ConversationTurn;
use crate::storage::ArcLogStore;

/// Returned in place of a transcript when the conversation has no turns yet.
pub const NO_HISTORY: &str = "No previous conversation history.";

/// Returned in place of a transcript when the log store query fails. The
/// failure is logged, never propagated, so the generation step always gets a
/// well-formed context.
pub const HISTORY_ERROR: &str = "Error retrieving conversation history.";

/// Retrieves a bounded window of a conversation and renders it as a flat
/// transcript for the generation prompt.
///
/// The window is the *oldest* `limit` turns of an ascending scan, not the
/// most recent ones.
pub struct HistoryWindow {
    store: ArcLogStore,
    limit: usize,
}

impl HistoryWindow {
    pub fn new(store: ArcLogStore) -> Self {
        Self {
            store,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Raw window fetch. Kept separate from `fetch` so callers and tests can
    /// tell a failing store apart from a conversation with zero turns.
    pub async fn retrieve(&self, conversation_id: &str) -> Result<Vec<ConversationTurn>> {
        self.store
            .query_turns(conversation_id, self.limit)
            .await
            .wrap_err(format!(
                "querying conversation log for {}",
                conversation_id
            ))
    }

    /// Transcript for the prompt context. Errors are converted to the fixed
    /// sentinel here, at the formatting boundary.
    pub async fn fetch(&self, conversation_id: &str) -> String {
        match self.retrieve(conversation_id).await {
            Ok(turns) => render(&turns),
            Err(err) => {
                log::error!("Error retrieving conversation history: {:?}", err);
                HISTORY_ERROR.to_string()
            }
        }
    }
}

/// Renders turns as `"{role}: {content}"` lines joined by a single newline.
pub fn render(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return NO_HISTORY.to_string();
    }

    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role(), turn.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
