//! The communicator: one owner for the composed text, its candidates, the
//! phrase store, speech and the emergency session.

use std::collections::VecDeque;
use std::time::Duration;

use voxbridge_core::config::VoxbridgeConfig;
use voxbridge_core::error::{Result, VoxbridgeError};
use voxbridge_core::events::DomainEvent;
use voxbridge_core::types::{Candidate, EmergencyType, PhraseId};
use voxbridge_emergency::{EmergencySession, EmergencyStateMachine};
use voxbridge_predict::{compose_selection, CustomPhrase, PhraseModelStore, PredictionEngine};
use voxbridge_speech::SpeechController;

/// Drives prediction and emergency handling from user input.
#[derive(Debug)]
pub struct Communicator {
    engine: PredictionEngine,
    store: PhraseModelStore,
    text: String,
    candidates: Vec<Candidate>,
    recent: VecDeque<String>,
    recent_capacity: usize,
    emergency: EmergencyStateMachine,
    speech: SpeechController,
}

impl Communicator {
    pub fn new(config: &VoxbridgeConfig, speech: SpeechController) -> Self {
        Self {
            engine: PredictionEngine::new(&config.prediction),
            store: PhraseModelStore::builtin(),
            text: String::new(),
            candidates: Vec::new(),
            recent: VecDeque::with_capacity(config.prediction.recent_capacity),
            recent_capacity: config.prediction.recent_capacity,
            emergency: EmergencyStateMachine::new(&config.emergency),
            speech,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn store(&self) -> &PhraseModelStore {
        &self.store
    }

    pub fn speech(&self) -> &SpeechController {
        &self.speech
    }

    /// Recently composed phrases, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    // =========================================================================
    // Text and prediction
    // =========================================================================

    /// Replace the composed text and recompute candidates.
    pub fn on_text_changed(&mut self, text: &str) -> &[Candidate] {
        self.text = text.to_string();
        self.refresh();
        &self.candidates
    }

    /// Choose the candidate at zero-based `index`.
    ///
    /// The composed text becomes the selection result, the candidate's usage
    /// is counted and the result is remembered as a recent phrase.
    pub fn choose(&mut self, index: usize) -> Result<String> {
        let candidate = self.candidates.get(index).cloned().ok_or_else(|| {
            VoxbridgeError::Validation(format!(
                "No candidate at position {} ({} shown)",
                index + 1,
                self.candidates.len()
            ))
        })?;

        let composed = compose_selection(&self.text, &candidate.text);
        self.store.increment_usage(&candidate.text);
        self.remember(&composed);
        tracing::debug!(
            rank = candidate.rank,
            confidence = candidate.confidence_score,
            "Candidate chosen"
        );

        self.text = composed.clone();
        self.refresh();
        Ok(composed)
    }

    /// Speak the composed text.
    pub async fn speak_current(&mut self) -> Result<()> {
        let text = self.text.clone();
        self.speak(&text).await
    }

    /// Speak `text`, counting a use of the matching phrase on success.
    pub async fn speak(&mut self, text: &str) -> Result<()> {
        self.speech.speak(text).await?;
        self.store.increment_usage(text.trim());
        Ok(())
    }

    pub fn add_phrase(&mut self, text: &str, category: &str) -> Result<CustomPhrase> {
        let phrase = self.store.add_custom_phrase(text, category)?;
        self.refresh();
        Ok(phrase)
    }

    pub fn remove_phrase(&mut self, id: PhraseId) -> bool {
        let removed = self.store.remove_custom_phrase(id);
        if removed {
            self.refresh();
        }
        removed
    }

    fn refresh(&mut self) {
        self.candidates = self.engine.predict(&self.text, &self.store);
    }

    fn remember(&mut self, text: &str) {
        if self.recent_capacity == 0 || self.recent.iter().any(|t| t == text) {
            return;
        }
        self.recent.push_front(text.to_string());
        self.recent.truncate(self.recent_capacity);
    }

    // =========================================================================
    // Emergency
    // =========================================================================

    pub fn session(&self) -> &EmergencySession {
        self.emergency.session()
    }

    pub fn emergency(&self) -> &EmergencyStateMachine {
        &self.emergency
    }

    pub fn request_emergency(&mut self, kind: EmergencyType) -> Result<()> {
        self.emergency.request_activation(kind)
    }

    pub fn cancel_emergency(&mut self) -> Result<()> {
        self.emergency.cancel()
    }

    pub fn activate_now(&mut self) -> Result<()> {
        self.emergency.activate()
    }

    pub fn deactivate_emergency(&mut self) -> Result<()> {
        self.emergency.deactivate()
    }

    pub fn share_location(&mut self) -> Result<bool> {
        self.emergency.share_location()
    }

    pub fn notify_contacts(&mut self) -> Result<bool> {
        self.emergency.notify_contacts()
    }

    pub fn set_emergency_message(&mut self, text: &str) -> Result<()> {
        self.emergency.set_message(text)
    }

    /// Let time pass on the emergency timers.
    pub fn advance(&mut self, elapsed: Duration) {
        self.emergency.advance(elapsed);
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.emergency.time_until_next()
    }

    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.emergency.drain_events()
    }
}
