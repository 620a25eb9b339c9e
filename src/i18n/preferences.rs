//! Durable preference storage.
//!
//! A flat JSON object on disk. The only key the site uses is `language`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::i18n::Language;

/// Storage key for the active language code.
pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty; it will be overwritten on next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring corrupt preferences file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read preferences file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a value and write the whole store back to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!(
                "Failed to create preferences directory {}",
                parent.display()
            ))?;
        }
        let contents =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize preferences")?;
        fs::write(&self.path, contents).context(format!(
            "Failed to write preferences file {}",
            self.path.display()
        ))?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }

    /// The persisted language, or the default when unset or unrecognized.
    pub fn language(&self) -> Language {
        Language::from_code_or_default(self.get(LANGUAGE_KEY))
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.set(LANGUAGE_KEY, language.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_defaults_to_english() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json"));
        assert_eq!(store.get(LANGUAGE_KEY), None);
        assert_eq!(store.language(), Language::ENGLISH);
    }

    #[test]
    fn test_language_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferenceStore::open(&path);
        store.set_language(Language::ROMANIAN).expect("Should save");

        let reopened = PreferenceStore::open(&path);
        assert_eq!(reopened.get(LANGUAGE_KEY), Some("ro"));
        assert_eq!(reopened.language(), Language::ROMANIAN);
    }

    #[test]
    fn test_unrecognized_language_defaults_to_english() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{ "language": "fr" }"#).unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.get(LANGUAGE_KEY), Some("fr"));
        assert_eq!(store.language(), Language::ENGLISH);
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let mut store = PreferenceStore::open(&path);
        assert_eq!(store.language(), Language::ENGLISH);

        store.set_language(Language::ROMANIAN).expect("Should overwrite");
        assert_eq!(PreferenceStore::open(&path).language(), Language::ROMANIAN);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("prefs.json");

        let mut store = PreferenceStore::open(&path);
        store.set("theme", "dark").expect("Should save");

        assert!(path.exists());
        assert_eq!(PreferenceStore::open(&path).get("theme"), Some("dark"));
    }

    #[test]
    fn test_other_keys_survive_language_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferenceStore::open(&path);
        store.set("theme", "dark").unwrap();
        store.set_language(Language::ROMANIAN).unwrap();

        let reopened = PreferenceStore::open(&path);
        assert_eq!(reopened.get("theme"), Some("dark"));
        assert_eq!(reopened.get(LANGUAGE_KEY), Some("ro"));
    }
}
