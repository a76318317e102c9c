use std::sync::Arc;

use super::*;
use crate::backend::MockBackend;
use crate::models::Role;
use crate::storage::{ArcLogStore, LogStore, MockLogStore};
use crate::storage::sqlite::Sqlite;
use crate::validate::ValidationError;

async fn sqlite_store() -> ArcLogStore {
    Arc::new(Sqlite::new(None).await.unwrap())
}

fn backend_with_reply(reply: &'static str) -> ArcBackend {
    let mut backend = MockBackend::new();
    backend.expect_name().return_const("mock".to_string());
    backend
        .expect_generate()
        .returning(move |_| Ok(reply.to_string()));
    Arc::new(backend)
}

#[tokio::test]
async fn test_chat_round_trip_on_fresh_conversation() {
    let store = sqlite_store().await;

    let mut backend = MockBackend::new();
    backend.expect_name().return_const("mock".to_string());
    backend
        .expect_generate()
        .withf(|prompt| {
            // Fresh conversation: the window excludes the turn in flight.
            prompt.text().contains("No previous conversation history.")
                && prompt.text().contains("User message: What is RAG?")
                && prompt.model() == "gpt-4o-mini"
        })
        .returning(|_| Ok("RAG stands for retrieval-augmented generation.".to_string()));

    let agent = RagAgent::new(store.clone())
        .with_backend(Arc::new(backend))
        .with_model("gpt-4o-mini");

    let reply = agent.chat("What is RAG?", "conv-1").await.unwrap();
    assert_eq!(
        reply.message,
        "RAG stands for retrieval-augmented generation."
    );
    assert_eq!(reply.conversation_id, "conv-1");

    let turns = store.query_turns("conv-1", 10).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role(), Role::User);
    assert_eq!(turns[0].content(), "What is RAG?");
    assert_eq!(turns[1].role(), Role::Assistant);
    assert_eq!(
        turns[1].content(),
        "RAG stands for retrieval-augmented generation."
    );
}

#[tokio::test]
async fn test_chat_includes_prior_history_in_prompt() {
    let store = sqlite_store().await;
    let agent = RagAgent::new(store.clone())
        .with_backend(backend_with_reply("first reply"))
        .with_model("gpt-4o-mini");
    agent.chat("Hello", "conv-1").await.unwrap();

    let mut backend = MockBackend::new();
    backend.expect_name().return_const("mock".to_string());
    backend
        .expect_generate()
        .withf(|prompt| {
            prompt.text().contains("user: Hello")
                && prompt.text().contains("assistant: first reply")
        })
        .returning(|_| Ok("second reply".to_string()));

    let agent = RagAgent::new(store)
        .with_backend(Arc::new(backend))
        .with_model("gpt-4o-mini");
    agent.chat("And again?", "conv-1").await.unwrap();
}

#[tokio::test]
async fn test_chat_sanitizes_before_persisting() {
    let store = sqlite_store().await;
    let agent = RagAgent::new(store.clone())
        .with_backend(backend_with_reply("ok"))
        .with_model("gpt-4o-mini");

    agent.chat("  What\x07 is RAG?  ", "conv-1").await.unwrap();

    let turns = store.query_turns("conv-1", 10).await.unwrap();
    assert_eq!(turns[0].content(), "What is RAG?");
}

#[tokio::test]
async fn test_chat_rejects_invalid_input() {
    let agent = RagAgent::new(sqlite_store().await);

    match agent.chat("", "conv-1").await.unwrap_err() {
        AgentError::Validation(err) => assert_eq!(err, ValidationError::EmptyMessage),
        other => panic!("unexpected error: {}", other),
    }

    let long = "a".repeat(10_001);
    match agent.chat(&long, "conv-1").await.unwrap_err() {
        AgentError::Validation(err) => assert_eq!(err, ValidationError::MessageTooLong),
        other => panic!("unexpected error: {}", other),
    }

    match agent.chat("Hello", "conv 1").await.unwrap_err() {
        AgentError::Validation(err) => {
            assert_eq!(err, ValidationError::InvalidConversationId)
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_chat_rejects_before_touching_the_store() {
    // A mock with no expectations panics on any call.
    let agent = RagAgent::new(Arc::new(MockLogStore::new()));
    assert!(agent.chat("", "conv-1").await.is_err());
}

#[tokio::test]
async fn test_chat_proceeds_when_persistence_fails() {
    let mut store = MockLogStore::new();
    store.expect_query_turns().returning(|_, _| Ok(vec![]));
    store
        .expect_append_turn()
        .returning(|_| Err(eyre::eyre!("table unavailable")));

    let agent = RagAgent::new(Arc::new(store))
        .with_backend(backend_with_reply("still works"))
        .with_model("gpt-4o-mini");

    let reply = agent.chat("Hello", "conv-1").await.unwrap();
    assert_eq!(reply.message, "still works");
}

#[tokio::test]
async fn test_chat_generation_failure_keeps_user_turn() {
    let store = sqlite_store().await;

    let mut backend = MockBackend::new();
    backend.expect_name().return_const("mock".to_string());
    backend
        .expect_generate()
        .returning(|_| Err(eyre::eyre!("upstream exploded")));

    let agent = RagAgent::new(store.clone())
        .with_backend(Arc::new(backend))
        .with_model("gpt-4o-mini");

    match agent.chat("Hello", "conv-1").await.unwrap_err() {
        AgentError::Generation(_) => {}
        other => panic!("unexpected error: {}", other),
    }

    // The user turn was appended before generation; no assistant turn exists.
    let turns = store.query_turns("conv-1", 10).await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role(), Role::User);
}

#[tokio::test]
async fn test_chat_falls_back_without_backend() {
    let store = sqlite_store().await;
    let agent = RagAgent::new(store.clone());
    assert!(!agent.has_backend());

    let reply = agent.chat("Hello", "conv-1").await.unwrap();
    assert!(reply.message.starts_with("RAG Agent is initializing."));
    assert!(reply.message.contains("'Hello'"));

    let turns = store.query_turns("conv-1", 10).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].role(), Role::Assistant);
}

#[tokio::test]
async fn test_persist_turn_reports_failure() {
    let store = sqlite_store().await;
    let turn = ConversationTurn::new_user("Hello").with_conversation_id("conv-1");
    assert!(persist_turn(&store, &turn).await);

    let mut failing = MockLogStore::new();
    failing
        .expect_append_turn()
        .returning(|_| Err(eyre::eyre!("boom")));
    let failing: ArcLogStore = Arc::new(failing);
    assert!(!persist_turn(&failing, &turn).await);
}
