use super::*;

#[test]
fn test_search_documents_placeholder() {
    let result = search_documents("What is RAG?");
    assert!(result.starts_with("Document search results for 'What is RAG?':"));
    assert!(result.contains("placeholder"));
}
