//! Conversation runtime: turn ordering, history, and stopping a turn in flight

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use category_agent::category::{Category, CategoryPatch};
use category_agent::config::Credentials;
use category_agent::conversation::{ConversationRuntime, TurnOutcome};
use category_agent::directory::{CategoryDirectory, InMemoryDirectory};
use category_agent::dispatcher::ActionDispatcher;
use category_agent::error::DirectoryResult;
use category_agent::llm::{ChatMessage, LlmClient, PassthroughClient};
use category_agent::messages::Locale;

fn creds() -> Credentials {
    Credentials::parse("https://shop.example.com", "admin", "pw").unwrap()
}

fn dispatcher(directory: Arc<dyn CategoryDirectory>) -> ActionDispatcher {
    ActionDispatcher::new(directory).with_locale(Locale::English)
}

/// Never answers; signals once the call has started
struct HangingLlm {
    started: Arc<Notify>,
}

#[async_trait]
impl LlmClient for HangingLlm {
    async fn get_response(&self, _user_text: &str, _history: &[ChatMessage]) -> Result<String> {
        self.started.notify_one();
        std::future::pending::<()>().await;
        unreachable!()
    }

    fn model_name(&self) -> &str {
        "hanging"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

/// Echoes like the passthrough but records the history it was given
#[derive(Default)]
struct RecordingLlm {
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn get_response(&self, user_text: &str, history: &[ChatMessage]) -> Result<String> {
        self.seen.lock().unwrap().push(history.to_vec());
        Ok(user_text.to_string())
    }

    fn model_name(&self) -> &str {
        "recording"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn get_response(&self, _user_text: &str, _history: &[ChatMessage]) -> Result<String> {
        Err(anyhow!("provider returned HTTP 500"))
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

/// Blocks `list_all` until the gate opens
struct GatedDirectory {
    inner: InMemoryDirectory,
    entered: Arc<Notify>,
    gate: Arc<Notify>,
}

#[async_trait]
impl CategoryDirectory for GatedDirectory {
    async fn list_all(&self, credentials: &Credentials) -> DirectoryResult<Vec<Category>> {
        self.entered.notify_one();
        self.gate.notified().await;
        self.inner.list_all(credentials).await
    }

    async fn update(
        &self,
        credentials: &Credentials,
        id: u64,
        patch: &CategoryPatch,
    ) -> DirectoryResult<Category> {
        self.inner.update(credentials, id, patch).await
    }

    fn backend_name(&self) -> &str {
        "gated"
    }
}

#[tokio::test]
async fn test_stop_while_waiting_for_llm() {
    let directory = Arc::new(InMemoryDirectory::new(vec![Category::new(1, "Shoes", "shoes")]));
    let started = Arc::new(Notify::new());
    let llm = Arc::new(HangingLlm {
        started: started.clone(),
    });
    let handle = ConversationRuntime::spawn(llm, dispatcher(directory.clone()), creds());

    let sender = handle.clone();
    let turn = tokio::spawn(async move { sender.send("list my categories").await });

    started.notified().await;
    handle.stop();

    let outcome = turn.await.unwrap().unwrap();
    assert_eq!(outcome, TurnOutcome::Cancelled);
    assert_eq!(directory.list_calls(), 0);
}

#[tokio::test]
async fn test_stop_during_dispatch_discards_result() {
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let directory = Arc::new(GatedDirectory {
        inner: InMemoryDirectory::new(vec![Category::new(1, "Shoes", "shoes")]),
        entered: entered.clone(),
        gate: gate.clone(),
    });
    let handle = ConversationRuntime::spawn(
        Arc::new(PassthroughClient),
        dispatcher(directory.clone()),
        creds(),
    );

    let sender = handle.clone();
    let turn =
        tokio::spawn(async move { sender.send(r#"{"action":"list_categories"}"#).await });

    entered.notified().await;
    handle.stop();
    gate.notify_one();

    let outcome = turn.await.unwrap().unwrap();
    assert_eq!(outcome, TurnOutcome::Cancelled);
    // The backend call itself ran to completion
    assert_eq!(directory.inner.list_calls(), 1);
}

#[tokio::test]
async fn test_next_turn_runs_after_stop() {
    let directory = Arc::new(InMemoryDirectory::new(vec![Category::new(1, "Shoes", "shoes")]));
    let handle = ConversationRuntime::spawn(
        Arc::new(PassthroughClient),
        dispatcher(directory.clone()),
        creds(),
    );

    // Stopping with nothing in flight has no effect on later turns
    handle.stop();

    let outcome = handle.send(r#"{"action":"list_categories"}"#).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Reply("Here are the available categories:\n- Shoes".to_string())
    );
}

#[tokio::test]
async fn test_turns_are_processed_in_order() {
    let directory = Arc::new(InMemoryDirectory::new(vec![Category::new(1, "Shoes", "shoes")]));
    let handle = ConversationRuntime::spawn(
        Arc::new(PassthroughClient),
        dispatcher(directory.clone()),
        creds(),
    );

    let rename = handle.send(
        r#"{"action":"update_category_metadata","payload":{"categoryName":"Shoes","name":"Sneakers"}}"#,
    );
    let list = handle.send(r#"{"action":"list_categories"}"#);
    let (rename, list) = tokio::join!(rename, list);

    assert_eq!(
        rename.unwrap(),
        TurnOutcome::Reply("Category \"Sneakers\" was updated successfully.".to_string())
    );
    assert_eq!(
        list.unwrap(),
        TurnOutcome::Reply("Here are the available categories:\n- Sneakers".to_string())
    );
}

#[tokio::test]
async fn test_history_is_passed_to_llm() {
    let directory = Arc::new(InMemoryDirectory::new(vec![]));
    let llm = Arc::new(RecordingLlm::default());
    let handle = ConversationRuntime::spawn(llm.clone(), dispatcher(directory), creds());

    handle.send("Hello").await.unwrap();
    handle.send("Still there?").await.unwrap();

    let seen = llm.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_empty());
    assert_eq!(
        seen[1],
        vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hello")]
    );
}

#[tokio::test]
async fn test_llm_failure_gives_apology() {
    let directory = Arc::new(InMemoryDirectory::new(vec![]));
    let handle = ConversationRuntime::spawn(Arc::new(FailingLlm), dispatcher(directory), creds());

    let outcome = handle.send("anything").await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Reply("Sorry, I couldn't process your request. Please try again.".to_string())
    );
}
