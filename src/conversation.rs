//! Conversation runtime
//!
//! One task per conversation owns the history and processes turns strictly
//! in order: a single-flight queue, no global locking. Each turn is
//!
//! ```text
//! user text ─► LLM (cancellable) ─► intent::parse ─► dispatcher ─► outcome
//! ```
//!
//! A stop signal cancels the turn in flight. While the LLM call is pending
//! it is abandoned immediately; once backend calls have been issued they run
//! to completion, but their result is discarded.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::dispatcher::ActionDispatcher;
use crate::error::ConversationError;
use crate::llm::{ChatMessage, LlmClient};

/// History lines kept for the LLM; older lines are dropped first
const MAX_HISTORY: usize = 50;

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Text to show the user
    Reply(String),
    /// The action completed without a message
    Silent,
    /// The user stopped the turn; nothing to show
    Cancelled,
}

struct TurnRequest {
    text: String,
    reply: oneshot::Sender<TurnOutcome>,
}

/// Token of the turn in flight, shared with the handle so `stop` can reach it
type CurrentTurn = Arc<Mutex<CancellationToken>>;

fn lock_turn(current: &CurrentTurn) -> MutexGuard<'_, CancellationToken> {
    current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cloneable handle to a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    tx: mpsc::UnboundedSender<TurnRequest>,
    current: CurrentTurn,
}

impl ConversationHandle {
    /// Queue a user message and wait for its outcome.
    ///
    /// Messages sent while another turn runs wait their turn.
    pub async fn send(&self, text: impl Into<String>) -> Result<TurnOutcome, ConversationError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(TurnRequest {
                text: text.into(),
                reply,
            })
            .map_err(|_| ConversationError::Closed)?;
        rx.await.map_err(|_| ConversationError::Closed)
    }

    /// Cancel the turn in flight, if any. Queued turns are unaffected.
    pub fn stop(&self) {
        lock_turn(&self.current).cancel();
    }
}

/// Owns one conversation: history, credentials and the turn queue
pub struct ConversationRuntime {
    llm: Arc<dyn LlmClient>,
    dispatcher: ActionDispatcher,
    credentials: Credentials,
    history: Vec<ChatMessage>,
    current: CurrentTurn,
    rx: mpsc::UnboundedReceiver<TurnRequest>,
}

impl ConversationRuntime {
    /// Start the conversation task. Must be called within a Tokio runtime.
    ///
    /// The task ends when every handle has been dropped.
    pub fn spawn(
        llm: Arc<dyn LlmClient>,
        dispatcher: ActionDispatcher,
        credentials: Credentials,
    ) -> ConversationHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let current: CurrentTurn = Arc::new(Mutex::new(CancellationToken::new()));

        let runtime = Self {
            llm,
            dispatcher,
            credentials,
            history: Vec::new(),
            current: current.clone(),
            rx,
        };
        tokio::spawn(runtime.run());

        ConversationHandle { tx, current }
    }

    async fn run(mut self) {
        info!(
            provider = self.llm.provider_name(),
            model = self.llm.model_name(),
            "conversation started"
        );
        while let Some(request) = self.rx.recv().await {
            let outcome = self.turn(&request.text).await;
            // The caller may have given up waiting
            let _ = request.reply.send(outcome);
        }
        debug!("conversation closed");
    }

    async fn turn(&mut self, text: &str) -> TurnOutcome {
        let token = CancellationToken::new();
        *lock_turn(&self.current) = token.clone();

        let raw = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("turn cancelled while waiting for the LLM");
                return TurnOutcome::Cancelled;
            }
            result = self.llm.get_response(text, &self.history) => result,
        };

        let reply = match raw {
            Ok(raw) => self.dispatcher.dispatch(&raw, &self.credentials).await,
            Err(e) => {
                warn!(error = %e, "LLM call failed");
                Some(self.dispatcher.messages().assistant_unavailable())
            }
        };

        if token.is_cancelled() {
            info!("turn cancelled, discarding dispatch result");
            return TurnOutcome::Cancelled;
        }

        self.remember(ChatMessage::user(text));
        match reply {
            Some(reply) => {
                self.remember(ChatMessage::assistant(reply.clone()));
                TurnOutcome::Reply(reply)
            }
            None => TurnOutcome::Silent,
        }
    }

    fn remember(&mut self, message: ChatMessage) {
        self.history.push(message);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}
