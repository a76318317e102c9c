pub(crate) const MIGRATION: &str = r#"
    CREATE TABLE IF NOT EXISTS conversation_log (
        conversation_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_conversation_log_id_created_at
        ON conversation_log (conversation_id, created_at);
"#;
