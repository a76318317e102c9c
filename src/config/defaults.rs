use super::constants::*;

pub(crate) fn history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

pub(crate) fn log_level() -> Option<String> {
    Some("info".to_string())
}

pub(crate) fn document_bucket() -> String {
    DOCUMENT_BUCKET.to_string()
}

pub(crate) fn embeddings_table() -> String {
    EMBEDDINGS_TABLE.to_string()
}
