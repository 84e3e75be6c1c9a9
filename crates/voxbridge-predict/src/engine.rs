//! Candidate generation.
//!
//! `predict` is a pure function of the input text and the store: it merges
//! prefix matches from every model, matching user phrases, and (when the input
//! signals urgency) the urgent phrases, then deduplicates, truncates, and ranks.

use std::collections::HashSet;

use voxbridge_core::config::PredictionConfig;
use voxbridge_core::types::Candidate;

use crate::context::PredictionContext;
use crate::store::PhraseModelStore;

/// Default cap on returned candidates.
pub const DEFAULT_MAX_RESULTS: usize = 6;

/// Stateless phrase predictor.
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    max_results: usize,
    /// Case-folded urgency triggers.
    urgency_triggers: Vec<String>,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(&PredictionConfig::default())
    }
}

impl PredictionEngine {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            max_results: config.max_results,
            urgency_triggers: config
                .urgency_triggers
                .iter()
                .map(|t| t.to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Rank continuations for `text` using the configured result cap.
    pub fn predict(&self, text: &str, store: &PhraseModelStore) -> Vec<Candidate> {
        self.predict_with_limit(text, store, self.max_results)
    }

    /// Rank continuations for `text`, returning at most `max_results`.
    pub fn predict_with_limit(
        &self,
        text: &str,
        store: &PhraseModelStore,
        max_results: usize,
    ) -> Vec<Candidate> {
        let ctx = PredictionContext::from_text(text);
        if ctx.is_blank() {
            return Vec::new();
        }

        let window = ctx.window();
        let lowered = ctx.lowercase_text();
        let mut accumulated: Vec<&str> = Vec::new();

        for model in store.all_models() {
            for (prefix, continuations) in model.entries() {
                if window.starts_with(&prefix.to_lowercase()) {
                    accumulated.extend(continuations.iter().map(String::as_str));
                }
            }
        }

        accumulated.extend(
            store
                .custom_phrases()
                .iter()
                .filter(|p| p.text.to_lowercase().contains(&lowered))
                .map(|p| p.text.as_str()),
        );

        if self.is_urgent(&lowered) {
            accumulated.extend(store.urgent_phrases().iter().map(|p| p.text.as_str()));
        }

        let mut seen = HashSet::new();
        let candidates: Vec<Candidate> = accumulated
            .into_iter()
            .filter(|text| seen.insert(*text))
            .take(max_results)
            .enumerate()
            .map(|(rank, text)| Candidate::ranked(text, rank))
            .collect();

        tracing::trace!(
            input_len = text.len(),
            window = %window,
            candidates = candidates.len(),
            "Prediction computed"
        );
        candidates
    }

    fn is_urgent(&self, lowered: &str) -> bool {
        self.urgency_triggers
            .iter()
            .any(|trigger| lowered.contains(trigger.as_str()))
    }
}

/// Text that results from choosing `candidate` while `input` is typed.
///
/// A candidate that already begins with the whole input (case-insensitive)
/// replaces it; anything else is appended after a single space.
pub fn compose_selection(input: &str, candidate: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.trim_start().is_empty() {
        return candidate.to_string();
    }
    if candidate
        .to_lowercase()
        .starts_with(&trimmed.trim_start().to_lowercase())
    {
        return candidate.to_string();
    }
    format!("{} {}", trimmed, candidate)
}
