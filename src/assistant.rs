//! Menu assistant: system prompt assembly and the completion round trip.
//!
//! The formatted menu is fetched from the [`MenuProvider`] on first use and
//! memoized on the assembler. Concurrent first callers share one fetch; a
//! failed fetch is not cached, so the next turn tries again.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::gemini::CompletionClient;
use crate::i18n::Language;
use crate::menu::MenuItem;
use crate::store::MenuProvider;

/// Reply when no API key is configured.
pub const OFFLINE_MESSAGE: &str =
    "I'm sorry, my connection to the kitchen is currently offline. Please configure the API key to chat.";

/// Reply when the menu or the completion call fails.
pub const FALLBACK_MESSAGE: &str =
    "I'm sorry, I'm having a little trouble connecting to the kitchen's knowledge base. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
        }
    }
}

/// Render the menu as labeled blocks under a `MENU:` header.
pub fn format_menu_context(items: &[MenuItem]) -> String {
    let blocks: String = items
        .iter()
        .map(|item| {
            let tags = if item.tags.is_empty() {
                "None".to_string()
            } else {
                item.tags
                    .iter()
                    .map(|tag| tag.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "- **{}** ({}): {}\n  *Description*: {}\n  *Ingredients*: {}\n  *Tags*: {}\n",
                item.name,
                item.category,
                item.price,
                item.description,
                item.ingredients.join(", "),
                tags
            )
        })
        .collect();

    format!("MENU:\n{}", blocks)
}

/// Build the system instruction for one chat turn.
pub fn build_system_instruction(menu_context: &str, language: Language) -> String {
    format!(
        r#"You are a helpful and friendly virtual host for "The Gemini Bistro".
Your knowledge is based ONLY on the menu provided below.
Answer customer questions about dishes, ingredients, dietary restrictions (like vegan, gluten-free), allergens, and popular items.
Do not invent dishes, ingredients or prices. If something is not on the menu, say so.
You MUST respond in {language}.

Guidelines:
- Be enthusiastic, descriptive, and concise
- If a question is vague, ask a short clarifying question
- When it fits, recommend pairings from the menu, such as a beverage or dessert for a main course
- If asked about topics outside the menu (like reservations, hours, location), politely guide them to the appropriate page or to call the restaurant

{menu_context}"#,
        language = language.name(),
        menu_context = menu_context
    )
}

/// Render the conversation so far followed by the new message.
pub fn build_prompt(history: &[ChatTurn], message: &str) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}\n", turn.sender.role(), turn.text))
        .chain(std::iter::once(format!("user: {}", message)))
        .collect()
}

pub struct PromptAssembler {
    menu: Arc<dyn MenuProvider>,
    completion: Option<Arc<dyn CompletionClient>>,
    menu_context: Mutex<Arc<OnceCell<String>>>,
}

impl PromptAssembler {
    /// `completion` is `None` when no credential is configured; every turn
    /// then answers with [`OFFLINE_MESSAGE`].
    pub fn new(menu: Arc<dyn MenuProvider>, completion: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            menu,
            completion,
            menu_context: Mutex::new(Arc::new(OnceCell::new())),
        }
    }

    pub fn is_online(&self) -> bool {
        self.completion.is_some()
    }

    fn current_cell(&self) -> Arc<OnceCell<String>> {
        self.menu_context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The formatted menu, fetched on first use and cached afterwards.
    pub async fn menu_context(&self) -> Result<String> {
        let cell = self.current_cell();
        let context = cell
            .get_or_try_init(|| async {
                let items = self
                    .menu
                    .menu_items()
                    .await
                    .context("Failed to load menu for assistant context")?;
                info!("Built assistant menu context from {} items", items.len());
                Ok::<_, anyhow::Error>(format_menu_context(&items))
            })
            .await?;
        Ok(context.clone())
    }

    /// Drop the cached menu so the next turn sees current data.
    ///
    /// A fetch already in flight completes into the old cell and is discarded.
    pub fn invalidate_menu_context(&self) {
        let mut cell = self
            .menu_context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cell = Arc::new(OnceCell::new());
        debug!("Assistant menu context invalidated");
    }

    /// Answer one user message.
    ///
    /// `history` must not contain the greeting that seeds the conversation
    /// nor `message` itself. Never fails: errors turn into
    /// [`FALLBACK_MESSAGE`], a missing credential into [`OFFLINE_MESSAGE`].
    pub async fn respond(&self, history: &[ChatTurn], message: &str, language: Language) -> String {
        let Some(completion) = &self.completion else {
            warn!("Assistant has no API key configured");
            return OFFLINE_MESSAGE.to_string();
        };

        match self.try_respond(completion.as_ref(), history, message, language).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error fetching AI response: {:#}", e);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    async fn try_respond(
        &self,
        completion: &dyn CompletionClient,
        history: &[ChatTurn],
        message: &str,
        language: Language,
    ) -> Result<String> {
        let menu_context = self.menu_context().await?;
        let system_instruction = build_system_instruction(&menu_context, language);
        let prompt = build_prompt(history, message);

        debug!(
            "Sending chat turn ({} prior turns, language {})",
            history.len(),
            language
        );
        completion.complete(&prompt, &system_instruction).await
    }
}
