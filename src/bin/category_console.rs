//! Operator console
//!
//! Runs the agent against a live WordPress site with the LLM step replaced by
//! a passthrough: every stdin line is treated as the model's raw output.
//!
//! ```bash
//! WP_SITE_URL=https://shop.example.com WP_USERNAME=admin WP_APP_PASSWORD='xxxx xxxx' \
//!   cargo run --features cli --bin category_console
//! > {"action": "list_categories"}
//! > {"action": "get_category_metadata", "payload": {"categoryName": "Shoes"}}
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use category_agent::config::AgentConfig;
use category_agent::conversation::{ConversationRuntime, TurnOutcome};
use category_agent::dispatcher::ActionDispatcher;
use category_agent::directory::WordPressDirectory;
use category_agent::llm::PassthroughClient;
use category_agent::messages::Locale;

#[derive(Parser, Debug)]
#[command(name = "category_console", about = "Dispatch category actions against a WordPress site")]
struct Args {
    /// Message language (fr, en); overrides CATEGORY_AGENT_LOCALE
    #[arg(long)]
    locale: Option<Locale>,

    /// Product category taxonomy; overrides WP_TAXONOMY
    #[arg(long)]
    taxonomy: Option<String>,
}

/// `RUST_LOG` when set, otherwise warnings and errors only
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AgentConfig::from_env()?;
    if let Some(locale) = args.locale {
        config.locale = locale;
    }
    if let Some(taxonomy) = args.taxonomy {
        config.wordpress.taxonomy = taxonomy;
    }

    let directory = Arc::new(WordPressDirectory::new(config.wordpress.clone())?);
    let dispatcher = ActionDispatcher::new(directory)
        .with_resolver(config.resolver)
        .with_locale(config.locale);
    let handle = ConversationRuntime::spawn(
        Arc::new(PassthroughClient),
        dispatcher,
        config.credentials.clone(),
    );

    eprintln!(
        "Connected to {} as {} - one action per line, Ctrl+D to quit",
        config.credentials.site_url, config.credentials.username
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match handle.send(line).await? {
            TurnOutcome::Reply(text) => println!("{}\n", text),
            TurnOutcome::Silent | TurnOutcome::Cancelled => {}
        }
    }

    Ok(())
}
