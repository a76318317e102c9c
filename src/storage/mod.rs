pub mod sqlite;

use std::sync::Arc;

use crate::{config::StorageConfig, models::ConversationTurn};
use async_trait::async_trait;
use eyre::Result;
use sqlite::Sqlite;

#[cfg(test)]
use mockall::automock;

/// Append-only per-conversation log. Turns are immutable once written; there
/// are no update or delete operations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogStore {
    /// Returns up to `limit` turns for the conversation, ascending by
    /// timestamp. The cap applies to the earliest turns of the scan.
    async fn query_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>>;

    async fn append_turn(&self, turn: &ConversationTurn) -> Result<()>;
}

pub type ArcLogStore = Arc<dyn LogStore + Send + Sync>;

pub async fn new_log_store(config: &StorageConfig) -> Result<ArcLogStore> {
    let store = match config {
        StorageConfig::Sqlite(sqlite_config) => {
            Arc::new(Sqlite::new(sqlite_config.path.as_deref()).await?)
        }
    };
    Ok(store)
}
