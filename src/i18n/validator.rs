//! Locale table validation.
//!
//! Checks that two language tables expose the same set of keys and that no
//! leaf is blank, so every key the site uses resolves in both languages.

use std::collections::BTreeSet;

use crate::i18n::LanguageTable;

/// Validation report containing errors and warnings about a pair of tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Keys present in one table but missing from the other
    pub errors: Vec<String>,

    /// Keys whose translated text is blank
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for key parity between language tables.
pub struct TableValidator;

impl TableValidator {
    /// Compare `translated` against the `reference` table.
    ///
    /// `reference_code` and `translated_code` only label the messages.
    pub fn validate(
        reference_code: &str,
        reference: &LanguageTable,
        translated_code: &str,
        translated: &LanguageTable,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        let reference_keys: BTreeSet<String> = reference.leaf_keys().into_iter().collect();
        let translated_keys: BTreeSet<String> = translated.leaf_keys().into_iter().collect();

        for key in reference_keys.difference(&translated_keys) {
            report
                .errors
                .push(format!("Key '{}' missing from '{}'", key, translated_code));
        }
        for key in translated_keys.difference(&reference_keys) {
            report
                .errors
                .push(format!("Key '{}' missing from '{}'", key, reference_code));
        }

        for (code, table, keys) in [
            (reference_code, reference, &reference_keys),
            (translated_code, translated, &translated_keys),
        ] {
            for key in keys {
                if table.lookup(key).is_some_and(|text| text.trim().is_empty()) {
                    report
                        .warnings
                        .push(format!("Key '{}' is blank in '{}'", key, code));
                }
            }
        }

        report
    }
}
