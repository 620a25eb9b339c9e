use thiserror::Error;
use tracing::debug;

use crate::assistant::{ChatTurn, PromptAssembler, Sender};
use crate::i18n::Language;

pub const GREETING_KEY: &str = "chatbot.initialMessage";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,
}

/// One visitor's conversation with the menu assistant.
///
/// The conversation always opens with a localized greeting from the
/// assistant. `send` borrows the session mutably, so a second message cannot
/// be submitted while a reply is outstanding.
#[derive(Debug, Clone)]
pub struct ChatSession {
    language: Language,
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            turns: vec![greeting(language)],
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Whether the conversation is still just the opening greeting.
    pub fn is_pristine(&self) -> bool {
        matches!(self.turns.as_slice(), [only] if only.sender == Sender::Ai)
    }

    /// Switch language. An untouched conversation is re-seeded with the
    /// greeting in the new language; one that has moved on is left as is.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        if self.is_pristine() {
            self.turns = vec![greeting(language)];
            debug!("Chat greeting reset for language {}", language);
        }
    }

    /// Send a message and append the assistant's reply.
    ///
    /// Only whitespace-only input is rejected; the assistant itself never
    /// fails, it degrades to a fixed apology.
    pub async fn send(
        &mut self,
        assistant: &PromptAssembler,
        message: &str,
    ) -> Result<&ChatTurn, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        // Skip the greeting; the new message is passed separately
        let history = self.turns.get(1..).unwrap_or_default().to_vec();
        self.turns.push(ChatTurn::user(message));

        let reply = assistant.respond(&history, message, self.language).await;
        self.turns.push(ChatTurn::ai(reply));

        Ok(&self.turns[self.turns.len() - 1])
    }
}

fn greeting(language: Language) -> ChatTurn {
    ChatTurn::ai(language.translate(GREETING_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::OFFLINE_MESSAGE;
    use crate::gemini::CompletionClient;
    use crate::store::MockBackend;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct EchoCompletion {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for EchoCompletion {
        async fn complete(&self, prompt: &str, _system: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(format!("echo {}", self.prompts.lock().unwrap().len()))
        }
    }

    fn online() -> (PromptAssembler, Arc<EchoCompletion>) {
        let completion = Arc::new(EchoCompletion {
            prompts: Mutex::new(Vec::new()),
        });
        let assistant = PromptAssembler::new(
            Arc::new(MockBackend::new(Duration::ZERO)),
            Some(completion.clone() as Arc<dyn CompletionClient>),
        );
        (assistant, completion)
    }

    #[test]
    fn test_new_session_is_seeded_with_greeting() {
        let session = ChatSession::new(Language::ENGLISH);
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].sender, Sender::Ai);
        assert_eq!(
            session.turns()[0].text,
            "Hello! I'm the virtual host for The Gemini Bistro. How can I help you with our menu today?"
        );
        assert!(session.is_pristine());
    }

    #[test]
    fn test_language_switch_resets_pristine_greeting() {
        let mut session = ChatSession::new(Language::ENGLISH);
        session.set_language(Language::ROMANIAN);

        assert_eq!(session.language(), Language::ROMANIAN);
        assert_eq!(session.turns().len(), 1);
        assert!(session.turns()[0].text.starts_with("Bună!"));

        session.set_language(Language::ENGLISH);
        assert!(session.turns()[0].text.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn test_language_switch_keeps_diverged_history() {
        let (assistant, _) = online();
        let mut session = ChatSession::new(Language::ENGLISH);
        session.send(&assistant, "Hi").await.unwrap();

        session.set_language(Language::ROMANIAN);

        assert_eq!(session.language(), Language::ROMANIAN);
        assert_eq!(session.turns().len(), 3);
        assert!(session.turns()[0].text.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn test_send_appends_user_and_reply() {
        let (assistant, _) = online();
        let mut session = ChatSession::new(Language::ENGLISH);

        let reply = session.send(&assistant, "What is vegan?").await.unwrap().clone();

        assert_eq!(reply, ChatTurn::ai("echo 1"));
        assert_eq!(session.turns().len(), 3);
        assert_eq!(session.turns()[1], ChatTurn::user("What is vegan?"));
        assert!(!session.is_pristine());
    }

    #[tokio::test]
    async fn test_history_excludes_greeting() {
        let (assistant, completion) = online();
        let mut session = ChatSession::new(Language::ENGLISH);

        session.send(&assistant, "First").await.unwrap();
        session.send(&assistant, "Second").await.unwrap();

        let prompts = completion.prompts.lock().unwrap().clone();
        assert_eq!(prompts[0], "user: First");
        assert_eq!(prompts[1], "user: First\nai: echo 1\nuser: Second");
        assert!(prompts.iter().all(|p| !p.contains("virtual host")));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (assistant, completion) = online();
        let mut session = ChatSession::new(Language::ENGLISH);

        assert_eq!(session.send(&assistant, "   ").await, Err(ChatError::EmptyMessage));
        assert_eq!(session.turns().len(), 1);
        assert!(completion.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_assistant_reply_is_appended() {
        let assistant = PromptAssembler::new(Arc::new(MockBackend::new(Duration::ZERO)), None);
        let mut session = ChatSession::new(Language::ROMANIAN);

        let reply = session.send(&assistant, "Salut").await.unwrap();
        assert_eq!(reply.text, OFFLINE_MESSAGE);
    }
}
