//! Language registry: Single source of truth for the site's languages.
//!
//! Each entry pairs a language's metadata with its embedded string table.
//! The registry is built once behind a `OnceLock` and is immutable afterwards.

use std::sync::OnceLock;

use crate::i18n::LanguageTable;

/// Configuration for a supported language.
#[derive(Debug)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "ro")
    pub code: &'static str,

    /// English name of the language, used when instructing the assistant
    pub name: &'static str,

    /// Native name of the language (e.g., "Română")
    pub native_name: &'static str,

    /// Whether this is the default language (only one should be true)
    pub is_default: bool,

    /// All translated strings for this language
    pub table: LanguageTable,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    ///
    /// The registry is built on first access, parsing the embedded locale
    /// tables.
    ///
    /// # Returns
    /// A static reference to the shared registry.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "en", "ro")
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all languages in declaration order.
    ///
    /// # Returns
    /// A vector of references to all language configurations.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the default language configuration.
    ///
    /// # Returns
    /// A reference to the language served when none is selected.
    ///
    /// # Panics
    /// Panics if the registry does not declare exactly one default language.
    pub fn default_language(&self) -> &LanguageConfig {
        let defaults: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }
}

/// Embedded locale sources, keyed by language code.
const EN_SOURCE: &str = include_str!("../../locales/en.json");
const RO_SOURCE: &str = include_str!("../../locales/ro.json");

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            table: embedded_table("en", EN_SOURCE),
        },
        LanguageConfig {
            code: "ro",
            name: "Romanian",
            native_name: "Română",
            is_default: false,
            table: embedded_table("ro", RO_SOURCE),
        },
    ]
}

// The locale files are compiled into the binary, so a parse failure is a
// build defect rather than a runtime condition.
fn embedded_table(code: &str, source: &str) -> LanguageTable {
    LanguageTable::from_json(source)
        .unwrap_or_else(|e| panic!("Embedded locale '{}' is invalid: {:#}", code, e))
}
