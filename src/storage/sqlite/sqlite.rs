#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;

use async_trait::async_trait;
use eyre::{Context, Result};
use tokio_rusqlite::{Connection, OpenFlags, params};

use crate::models::{ConversationTurn, Role};
use crate::storage::LogStore;

use super::migration::MIGRATION;

pub struct Sqlite {
    conn: Connection,
}

impl Sqlite {
    pub async fn new(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
            .await
            .wrap_err(format!("opening database path: {}", path))?,
            None => Connection::open_in_memory()
                .await
                .wrap_err("opening in-memory database")?,
        };

        let ret = Self { conn };
        ret.run_migration().await.wrap_err("running migration")?;
        Ok(ret)
    }

    async fn run_migration(&self) -> Result<()> {
        self.conn
            .call(|conn| Ok(conn.execute_batch(MIGRATION)?))
            .await
            .wrap_err("executing migration")?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for Sqlite {
    async fn query_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>> {
        let conversation_id = conversation_id.to_string();
        let turns = self
            .conn
            .call(move |conn| {
                // rowid breaks timestamp ties in insertion order.
                let mut stmt = conn.prepare(
                    "SELECT conversation_id, created_at, role, content FROM conversation_log
                     WHERE conversation_id = ? ORDER BY created_at ASC, rowid ASC LIMIT ?",
                )?;

                let mut rows = stmt.query(params![conversation_id, limit as i64])?;
                let mut turns = vec![];
                while let Some(row) = rows.next()? {
                    let conversation_id: String = row.get(0)?;
                    let created_at: i64 = row.get(1)?;
                    let role: String = row.get(2)?;
                    let content: String = row.get(3)?;

                    let created_at = chrono::DateTime::from_timestamp_millis(created_at).ok_or(
                        tokio_rusqlite::Error::Other(eyre::eyre!("invalid timestamp").into()),
                    )?;
                    let role = Role::parse(&role).ok_or(tokio_rusqlite::Error::Other(
                        eyre::eyre!("invalid role: {}", role).into(),
                    ))?;

                    turns.push(
                        ConversationTurn::new(role, content)
                            .with_conversation_id(conversation_id)
                            .with_created_at(created_at),
                    );
                }
                Ok(turns)
            })
            .await?;
        Ok(turns)
    }

    async fn append_turn(&self, turn: &ConversationTurn) -> Result<()> {
        let conversation_id = turn.conversation_id().to_string();
        let created_at = turn.created_at().timestamp_millis();
        let role = turn.role().to_string();
        let content = turn.content().to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO conversation_log (conversation_id, created_at, role, content)
                     VALUES (?, ?, ?, ?)",
                    params![conversation_id, created_at, role, content],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}
