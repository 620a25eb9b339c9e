//! Terminal chat with the menu assistant.
//!
//! Usage:
//!   cargo run --bin chat
//!
//! Commands:
//!   /lang <en|ro>   Switch language (remembered across runs)
//!   /quit           Exit
//!
//! Optional environment variables:
//! - API_KEY (without it the assistant answers offline)
//! - GEMINI_MODEL (defaults to gemini-2.5-flash)
//! - PREFERENCES_FILE (defaults to data/preferences.json)
//! - MOCK_API_DELAY_MS (defaults to 500)

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use gemini_bistro::assistant::PromptAssembler;
use gemini_bistro::chat::ChatSession;
use gemini_bistro::config::Config;
use gemini_bistro::gemini::{CompletionClient, GeminiClient};
use gemini_bistro::i18n::{Language, PreferenceStore};
use gemini_bistro::store::MockBackend;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gemini_bistro=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let mut preferences = PreferenceStore::open(&config.preferences_file);

    let backend = Arc::new(MockBackend::new(config.mock_api_delay));
    let completion = GeminiClient::from_config(&config)
        .map(|client| Arc::new(client) as Arc<dyn CompletionClient>);
    let assistant = PromptAssembler::new(backend, completion);

    let mut session = ChatSession::new(preferences.language());
    info!("Chat started in {}", session.language());
    print_turn(session.turns().last().map(|t| t.text.as_str()).unwrap_or_default());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();

        if line == "/quit" {
            break;
        }

        if let Some(code) = lang_command(line) {
            match Language::from_code(code) {
                Ok(language) => {
                    session.set_language(language);
                    if let Err(e) = preferences.set_language(language) {
                        warn!("Could not save language preference: {:#}", e);
                    }
                    println!("[{}]", language.native_name());
                    if session.is_pristine() {
                        print_turn(&session.turns()[0].text);
                    }
                }
                Err(e) => println!("{}", e),
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }

        let reply = session.send(&assistant, line).await?;
        print_turn(&reply.text);
    }

    Ok(())
}

/// The argument of a `/lang <code>` command, or `None` for any other input.
fn lang_command(line: &str) -> Option<&str> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    (command == "/lang").then(|| rest.trim())
}

fn print_turn(text: &str) {
    println!("\n{}\n", text);
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}
