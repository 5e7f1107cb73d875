//! Chat-driven WordPress product-category agent
//!
//! Lets a user read and edit product-category metadata (name, slug,
//! description, SEO title, meta description, focus keyphrase) by chatting.
//! An external LLM turns the user's text into a JSON action; this crate
//! decodes it, resolves the category name against the live catalog and
//! applies the read or write.
//!
//! ## Architecture
//!
//! ```text
//! user text → LlmClient → intent::parse → ActionDispatcher
//!                                            │
//!                              NameResolver ─┤
//!                                            └─ CategoryDirectory (WordPress REST)
//!                                                      │
//!                                               response text
//! ```
//!
//! [`conversation::ConversationRuntime`] runs one turn at a time per
//! conversation and supports stopping the turn in flight.
//!
//! ## Configuration
//!
//! `WP_SITE_URL`, `WP_USERNAME` and `WP_APP_PASSWORD` identify the site; see
//! [`config`] for the optional tunables.

pub mod category;
pub mod config;
pub mod conversation;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod llm;
pub mod messages;
pub mod resolver;

// Re-exports for convenience
pub use category::{Category, CategoryPatch, SeoMeta};
pub use config::{AgentConfig, Credentials};
pub use conversation::{ConversationHandle, ConversationRuntime, TurnOutcome};
pub use directory::{CategoryDirectory, InMemoryDirectory, WordPressDirectory};
pub use dispatcher::ActionDispatcher;
pub use error::{DirectoryError, DirectoryResult};
pub use intent::Action;
pub use llm::LlmClient;
pub use messages::Locale;
pub use resolver::{NameResolver, ResolutionResult};
