//! Language type: validated handle onto a registry entry.

use std::fmt;

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::i18n::{LanguageConfig, LanguageRegistry, LanguageTable};

/// A validated language.
///
/// Only codes known to the registry can be turned into a `Language`, so
/// every accessor below can rely on the registry entry being present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ro")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const ROMANIAN: Language = Language { code: "ro" };

    /// Create a Language from a language code string.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (case-sensitive)
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Like [`Language::from_code`], but unset or unrecognized codes fall
    /// back to the default language.
    ///
    /// # Arguments
    /// * `code` - An optional language code, e.g. from a query parameter
    ///   or the preference store
    ///
    /// # Returns
    /// The matching `Language`, or the registry default.
    pub fn from_code_or_default(code: Option<&str>) -> Language {
        match code {
            Some(code) => Language::from_code(code).unwrap_or_else(|_| {
                debug!("Unrecognized language '{}', using default", code);
                Language::default()
            }),
            None => Language::default(),
        }
    }

    /// Get the ISO 639-1 language code.
    ///
    /// # Returns
    /// A static string like "en" or "ro".
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English name of the language (e.g., "Romanian").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Native name of the language (e.g., "Română").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// The string table for this language.
    pub fn table(&self) -> &'static LanguageTable {
        &self.config().table
    }

    /// Resolve a translation key, falling back to the key itself.
    ///
    /// Misses are logged at warn level and never surface as errors.
    ///
    /// # Arguments
    /// * `key` - Dot-separated path into the table (e.g., "chatbot.initialMessage")
    ///
    /// # Returns
    /// * The translated text if the key resolves to a leaf string
    /// * `key` unchanged otherwise
    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        match self.table().lookup(key) {
            Some(text) => text,
            None => {
                warn!("Translation key not found: {} ({})", key, self.code);
                key
            }
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
