//! Phrase models and the built-in catalogs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named mapping from a one- or two-token prefix key to its continuations.
///
/// Entries keep their declaration order, and so do the continuations of each
/// entry; both orders are the ranking tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseModel {
    name: String,
    entries: Vec<(String, Vec<String>)>,
}

impl PhraseModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add a prefix key with its continuations.
    ///
    /// A key declared twice keeps its first position and gains the new
    /// continuations after the existing ones.
    pub fn with_entry(mut self, prefix: &str, continuations: &[&str]) -> Self {
        let continuations = continuations.iter().map(|c| c.to_string());
        match self.entries.iter_mut().find(|(key, _)| key == prefix) {
            Some((_, existing)) => existing.extend(continuations),
            None => self.entries.push((prefix.to_string(), continuations.collect())),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix keys with their continuations, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, continuations)| (key.as_str(), continuations.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Everyday needs and questions.
    pub fn general() -> Self {
        PhraseModel::new("general")
            .with_entry("I", &["need", "want", "am", "have", "would like"])
            .with_entry(
                "I need",
                &["help", "water", "food", "medicine", "assistance", "to rest"],
            )
            .with_entry(
                "I want",
                &["to eat", "to drink", "to sleep", "to go home", "help"],
            )
            .with_entry(
                "I am",
                &["hungry", "thirsty", "tired", "in pain", "sick", "happy"],
            )
            .with_entry(
                "Can you",
                &["help me", "get me", "show me", "tell me", "explain"],
            )
            .with_entry(
                "Where is",
                &["the bathroom", "water", "food", "help", "the doctor"],
            )
            .with_entry("How", &["are you", "do I", "can I", "much is", "long will"])
    }

    /// Symptoms and care requests.
    pub fn medical() -> Self {
        PhraseModel::new("medical")
            .with_entry(
                "I have",
                &["pain", "headache", "fever", "nausea", "dizziness"],
            )
            .with_entry(
                "My",
                &["head hurts", "stomach hurts", "back hurts", "arm hurts", "leg hurts"],
            )
            .with_entry(
                "I feel",
                &["sick", "dizzy", "tired", "weak", "better", "worse"],
            )
            .with_entry(
                "I need",
                &["medicine", "a doctor", "to lie down", "help", "water"],
            )
    }

    /// Greetings and courtesy.
    pub fn social() -> Self {
        PhraseModel::new("social")
            .with_entry(
                "Hello",
                &["how are you?", "nice to meet you", "good morning", "good afternoon"],
            )
            .with_entry("How are", &["you?", "you doing?", "you feeling?"])
            .with_entry(
                "Thank you",
                &["so much", "for your help", "very much", "for everything"],
            )
            .with_entry(
                "Goodbye",
                &["see you later", "take care", "have a good day", "until next time"],
            )
    }
}

/// Urgency level of a built-in urgent phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgentPriority {
    High,
    Medium,
}

impl fmt::Display for UrgentPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgentPriority::High => write!(f, "high"),
            UrgentPriority::Medium => write!(f, "medium"),
        }
    }
}

/// A built-in phrase offered whenever the input signals urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgentPhrase {
    pub text: String,
    pub category: String,
    pub priority: UrgentPriority,
    pub usage_count: u32,
}

impl UrgentPhrase {
    pub fn new(text: &str, category: &str, priority: UrgentPriority) -> Self {
        Self {
            text: text.to_string(),
            category: category.to_string(),
            priority,
            usage_count: 0,
        }
    }

    pub fn builtin() -> Vec<UrgentPhrase> {
        vec![
            UrgentPhrase::new("I need emergency help", "emergency", UrgentPriority::High),
            UrgentPhrase::new("Call ambulance please", "emergency", UrgentPriority::High),
            UrgentPhrase::new("I am in danger", "emergency", UrgentPriority::High),
            UrgentPhrase::new("Help me quickly", "emergency", UrgentPriority::Medium),
            UrgentPhrase::new("I feel very sick", "medical", UrgentPriority::Medium),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_declaration_order() {
        let model = PhraseModel::general();
        let keys: Vec<&str> = model.entries().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["I", "I need", "I want", "I am", "Can you", "Where is", "How"]
        );
    }

    #[test]
    fn test_duplicate_key_extends_in_place() {
        let model = PhraseModel::new("test")
            .with_entry("a", &["1", "2"])
            .with_entry("b", &["x"])
            .with_entry("a", &["3"]);
        let entries: Vec<(&str, &[String])> = model.entries().collect();
        assert_eq!(model.len(), 2);
        assert_eq!(entries[0].0, "a");
        assert_eq!(entries[0].1, ["1", "2", "3"]);
    }

    #[test]
    fn test_builtin_catalogs() {
        assert_eq!(PhraseModel::general().name(), "general");
        assert_eq!(PhraseModel::medical().len(), 4);
        assert_eq!(PhraseModel::social().len(), 4);
        assert!(PhraseModel::new("empty").is_empty());
    }

    #[test]
    fn test_builtin_urgent_phrases() {
        let phrases = UrgentPhrase::builtin();
        assert_eq!(phrases.len(), 5);
        assert_eq!(
            phrases.iter().filter(|p| p.category == "emergency").count(),
            4
        );
        assert!(phrases.iter().all(|p| p.usage_count == 0));
        assert_eq!(phrases[3].priority, UrgentPriority::Medium);
    }
}
