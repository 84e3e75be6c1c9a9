//! Phrase model store: the single source of phrases the engine reads.

use serde::{Deserialize, Serialize};
use voxbridge_core::error::{Result, VoxbridgeError};
use voxbridge_core::types::PhraseId;

use crate::model::{PhraseModel, UrgentPhrase};

/// Category given to user phrases added without one.
pub const DEFAULT_CATEGORY: &str = "custom";

/// A phrase written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPhrase {
    pub id: PhraseId,
    pub text: String,
    pub category: String,
    pub usage_count: u32,
}

/// Holds the phrase models, the urgent phrases, and the user's phrases.
///
/// Models and urgent phrases are fixed at construction. User phrases are kept
/// most-recent-first.
#[derive(Debug, Clone, Default)]
pub struct PhraseModelStore {
    models: Vec<PhraseModel>,
    urgent: Vec<UrgentPhrase>,
    custom: Vec<CustomPhrase>,
}

impl PhraseModelStore {
    /// Create a store with the given models and no phrases.
    pub fn new(models: Vec<PhraseModel>) -> Self {
        Self {
            models,
            urgent: Vec::new(),
            custom: Vec::new(),
        }
    }

    /// Create a store with the built-in catalogs and starter phrases.
    pub fn builtin() -> Self {
        let mut store = Self::new(vec![
            PhraseModel::general(),
            PhraseModel::medical(),
            PhraseModel::social(),
        ])
        .with_urgent_phrases(UrgentPhrase::builtin());

        for (text, category, usage_count) in [
            ("I need my medication at 2 PM", "medical", 15),
            ("I prefer to sit near the window", "preference", 8),
            ("My favorite drink is water", "personal", 12),
        ] {
            if let Ok(phrase) = store.add_custom_phrase(text, category) {
                store.set_usage(phrase.id, usage_count);
            }
        }
        store
    }

    pub fn with_urgent_phrases(mut self, urgent: Vec<UrgentPhrase>) -> Self {
        self.urgent = urgent;
        self
    }

    /// Models in declaration order.
    pub fn all_models(&self) -> &[PhraseModel] {
        &self.models
    }

    pub fn urgent_phrases(&self) -> &[UrgentPhrase] {
        &self.urgent
    }

    /// User phrases, most recent first.
    pub fn custom_phrases(&self) -> &[CustomPhrase] {
        &self.custom
    }

    /// Add a user phrase in front of the existing ones.
    ///
    /// Fails with `Validation` when the text is blank. A blank category falls
    /// back to [`DEFAULT_CATEGORY`].
    pub fn add_custom_phrase(&mut self, text: &str, category: &str) -> Result<CustomPhrase> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoxbridgeError::Validation(
                "Custom phrase text must not be empty".to_string(),
            ));
        }
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            c => c,
        };

        let phrase = CustomPhrase {
            id: PhraseId::new(),
            text: text.to_string(),
            category: category.to_string(),
            usage_count: 0,
        };
        tracing::info!(phrase_id = %phrase.id, category = %phrase.category, "Custom phrase added");
        self.custom.insert(0, phrase.clone());
        Ok(phrase)
    }

    /// Remove a user phrase. Unknown ids are ignored.
    ///
    /// Returns whether a phrase was removed.
    pub fn remove_custom_phrase(&mut self, id: PhraseId) -> bool {
        let before = self.custom.len();
        self.custom.retain(|p| p.id != id);
        let removed = self.custom.len() != before;
        if removed {
            tracing::info!(phrase_id = %id, "Custom phrase removed");
        }
        removed
    }

    /// Count one use of the first phrase whose text equals `text` exactly.
    ///
    /// Built-in urgent phrases are searched before user phrases. Returns
    /// whether a phrase matched.
    pub fn increment_usage(&mut self, text: &str) -> bool {
        if let Some(phrase) = self.urgent.iter_mut().find(|p| p.text == text) {
            phrase.usage_count = phrase.usage_count.saturating_add(1);
            return true;
        }
        if let Some(phrase) = self.custom.iter_mut().find(|p| p.text == text) {
            phrase.usage_count = phrase.usage_count.saturating_add(1);
            return true;
        }
        false
    }

    /// Usage count of the first phrase matching `text`, if any.
    pub fn usage_count(&self, text: &str) -> Option<u32> {
        self.urgent
            .iter()
            .find(|p| p.text == text)
            .map(|p| p.usage_count)
            .or_else(|| {
                self.custom
                    .iter()
                    .find(|p| p.text == text)
                    .map(|p| p.usage_count)
            })
    }

    fn set_usage(&mut self, id: PhraseId, usage_count: u32) {
        if let Some(phrase) = self.custom.iter_mut().find(|p| p.id == id) {
            phrase.usage_count = usage_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_custom_phrase_prepends() {
        let mut store = PhraseModelStore::default();
        let first = store.add_custom_phrase("Open the window", "home").unwrap();
        let second = store.add_custom_phrase("  Close the door ", "").unwrap();

        assert_eq!(second.text, "Close the door");
        assert_eq!(second.category, DEFAULT_CATEGORY);
        assert_eq!(second.usage_count, 0);
        assert_ne!(first.id, second.id);

        let texts: Vec<&str> = store.custom_phrases().iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Close the door", "Open the window"]);
    }

    #[test]
    fn test_add_blank_phrase_is_validation_error() {
        let mut store = PhraseModelStore::default();
        let err = store.add_custom_phrase("   ", "custom").unwrap_err();
        assert!(matches!(err, VoxbridgeError::Validation(_)));
        assert!(store.custom_phrases().is_empty());
    }

    #[test]
    fn test_remove_custom_phrase_is_idempotent() {
        let mut store = PhraseModelStore::default();
        let phrase = store.add_custom_phrase("Turn on the light", "home").unwrap();

        assert!(store.remove_custom_phrase(phrase.id));
        assert!(!store.remove_custom_phrase(phrase.id));
        assert!(!store.remove_custom_phrase(PhraseId::new()));
        assert!(store.custom_phrases().is_empty());
    }

    #[test]
    fn test_increment_usage_custom() {
        let mut store = PhraseModelStore::default();
        store.add_custom_phrase("Turn on the light", "home").unwrap();

        assert!(store.increment_usage("Turn on the light"));
        assert!(store.increment_usage("Turn on the light"));
        assert_eq!(store.usage_count("Turn on the light"), Some(2));
    }

    #[test]
    fn test_increment_usage_prefers_builtin() {
        let mut store = PhraseModelStore::default().with_urgent_phrases(UrgentPhrase::builtin());
        store.add_custom_phrase("I am in danger", "custom").unwrap();

        assert!(store.increment_usage("I am in danger"));
        assert_eq!(store.urgent_phrases()[2].usage_count, 1);
        assert_eq!(store.custom_phrases()[0].usage_count, 0);
    }

    #[test]
    fn test_increment_usage_requires_exact_match() {
        let mut store = PhraseModelStore::builtin();
        assert!(!store.increment_usage("i am in danger"));
        assert!(!store.increment_usage("nothing like this"));
        assert_eq!(store.usage_count("nothing like this"), None);
    }

    #[test]
    fn test_builtin_store() {
        let store = PhraseModelStore::builtin();
        let names: Vec<&str> = store.all_models().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["general", "medical", "social"]);
        assert_eq!(store.urgent_phrases().len(), 5);
        assert_eq!(store.custom_phrases().len(), 3);
        assert_eq!(store.custom_phrases()[0].text, "My favorite drink is water");
        assert_eq!(store.usage_count("I need my medication at 2 PM"), Some(15));
    }
}
