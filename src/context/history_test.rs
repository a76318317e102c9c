use std::sync::Arc;

use super::*;
use crate::models::ConversationTurn;
use crate::storage::{ArcLogStore, MockLogStore};

fn store_with(turns: Vec<ConversationTurn>) -> ArcLogStore {
    let mut store = MockLogStore::new();
    store
        .expect_query_turns()
        .returning(move |_, _| Ok(turns.clone()));
    Arc::new(store)
}

#[test]
fn test_render_empty() {
    assert_eq!(render(&[]), "No previous conversation history.");
}

#[test]
fn test_render_transcript() {
    let turns = vec![
        ConversationTurn::new_user("Hello"),
        ConversationTurn::new_assistant("Hi there"),
    ];
    assert_eq!(render(&turns), "user: Hello\nassistant: Hi there");
}

#[test]
fn test_render_keeps_newlines_within_content() {
    let turns = vec![ConversationTurn::new_user("line one\nline two")];
    assert_eq!(render(&turns), "user: line one\nline two");
}

#[tokio::test]
async fn test_fetch_formats_messages() {
    let window = HistoryWindow::new(store_with(vec![
        ConversationTurn::new_user("Hello"),
        ConversationTurn::new_assistant("Hi there"),
    ]));

    let result = window.fetch("conversation-1").await;
    assert_eq!(result, "user: Hello\nassistant: Hi there");
}

#[tokio::test]
async fn test_fetch_empty_conversation() {
    let window = HistoryWindow::new(store_with(vec![]));
    let result = window.fetch("conversation-1").await;
    assert_eq!(result, "No previous conversation history.");
}

#[tokio::test]
async fn test_fetch_swallows_store_errors() {
    let mut store = MockLogStore::new();
    store
        .expect_query_turns()
        .returning(|_, _| Err(eyre::eyre!("boom")));
    let window = HistoryWindow::new(Arc::new(store));

    let result = window.fetch("conversation-2").await;
    assert_eq!(result, "Error retrieving conversation history.");
}

#[tokio::test]
async fn test_retrieve_distinguishes_failure_from_empty() {
    let window = HistoryWindow::new(store_with(vec![]));
    assert!(window.retrieve("conv-1").await.unwrap().is_empty());

    let mut store = MockLogStore::new();
    store
        .expect_query_turns()
        .returning(|_, _| Err(eyre::eyre!("boom")));
    let window = HistoryWindow::new(Arc::new(store));
    assert!(window.retrieve("conv-1").await.is_err());
}

#[tokio::test]
async fn test_fetch_passes_limit_through() {
    let mut store = MockLogStore::new();
    store
        .expect_query_turns()
        .withf(|id, limit| id == "conv-1" && *limit == 3)
        .returning(|_, _| Ok(vec![]));
    let window = HistoryWindow::new(Arc::new(store)).with_limit(3);

    window.fetch("conv-1").await;
}

#[test]
fn test_default_limit() {
    let window = HistoryWindow::new(store_with(vec![]));
    assert_eq!(window.limit(), 10);
}
