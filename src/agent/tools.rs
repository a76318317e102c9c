#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;

/// Placeholder document search. A full implementation would embed the query,
/// search the vector index and return relevant excerpts; the demo ships with
/// a fixed response so the rest of the pipeline can be exercised end to end.
pub fn search_documents(query: &str) -> String {
    format!(
        "Document search results for '{}': This is a placeholder. In the full implementation, \
         this would return relevant document excerpts based on semantic similarity.",
        query
    )
}
