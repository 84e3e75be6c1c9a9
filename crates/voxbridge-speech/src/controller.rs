//! Speech controller tracking the outward "in progress" flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use voxbridge_core::config::SpeechConfig;
use voxbridge_core::error::{Result, VoxbridgeError};

use crate::capability::{SpeechRecognizer, SpeechSynthesizer, Transcript};

/// Front door to the speech capabilities.
///
/// Either capability may be absent; calls then fail with
/// `CapabilityUnavailable` without touching any other state.
pub struct SpeechController {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    settings: SpeechConfig,
    speaking: Arc<AtomicBool>,
    listening: Arc<AtomicBool>,
}

impl std::fmt::Debug for SpeechController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechController")
            .field("has_synthesizer", &self.synthesizer.is_some())
            .field("has_recognizer", &self.recognizer.is_some())
            .field("settings", &self.settings)
            .field("speaking", &self.is_speaking())
            .field("listening", &self.is_listening())
            .finish()
    }
}

impl SpeechController {
    /// Create a controller with no capabilities attached.
    pub fn new(settings: SpeechConfig) -> Self {
        Self {
            synthesizer: None,
            recognizer: None,
            settings,
            speaking: Arc::new(AtomicBool::new(false)),
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn settings(&self) -> &SpeechConfig {
        &self.settings
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn can_listen(&self) -> bool {
        self.recognizer.is_some()
    }

    /// True only while a `speak` call is in flight.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// True while a transcript stream is open.
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Speak `text` with the configured voice.
    pub async fn speak(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoxbridgeError::Validation(
                "Nothing to speak: text is empty".to_string(),
            ));
        }
        let synthesizer = self.synthesizer.as_ref().ok_or_else(|| {
            tracing::warn!("Speech synthesis requested but not available");
            VoxbridgeError::CapabilityUnavailable("speech synthesis".to_string())
        })?;

        let speaking = FlagGuard::raise(&self.speaking);
        tracing::debug!(text_len = text.len(), rate = self.settings.rate, "Speaking");
        let result = synthesizer.speak(text, &self.settings).await;
        drop(speaking);

        if let Err(ref e) = result {
            tracing::warn!(error = %e, "Speech synthesis failed");
        }
        result
    }

    /// Interrupt speech in progress. Returns whether anything was playing.
    pub fn stop_speaking(&self) -> bool {
        let was_speaking = self.speaking.swap(false, Ordering::SeqCst);
        if was_speaking {
            if let Some(synthesizer) = &self.synthesizer {
                synthesizer.stop();
            }
        }
        was_speaking
    }

    /// Open a recognition session.
    ///
    /// Fails with `Validation` if a session is already open.
    pub async fn listen(&self) -> Result<TranscriptStream> {
        let recognizer = self.recognizer.as_ref().ok_or_else(|| {
            tracing::warn!("Speech recognition requested but not available");
            VoxbridgeError::CapabilityUnavailable("speech recognition".to_string())
        })?;
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(VoxbridgeError::Validation(
                "Speech recognition is already listening".to_string(),
            ));
        }

        match recognizer.listen(&self.settings).await {
            Ok(rx) => {
                tracing::debug!(language = %self.settings.language, "Listening started");
                Ok(TranscriptStream {
                    rx,
                    listening: Arc::clone(&self.listening),
                    interim_results: self.settings.interim_results,
                })
            }
            Err(e) => {
                self.listening.store(false, Ordering::SeqCst);
                tracing::warn!(error = %e, "Speech recognition failed to start");
                Err(e)
            }
        }
    }
}

/// Holds a flag raised until dropped, so a cancelled call still clears it.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Open recognition session. Clears the listening flag when it ends or drops.
pub struct TranscriptStream {
    rx: mpsc::Receiver<Result<Transcript>>,
    listening: Arc<AtomicBool>,
    interim_results: bool,
}

impl TranscriptStream {
    /// Next transcript, or `None` once the session is over.
    ///
    /// Partial transcripts are skipped unless interim results are enabled.
    pub async fn next(&mut self) -> Option<Result<Transcript>> {
        loop {
            match self.rx.recv().await {
                Some(Ok(t)) if !t.is_final && !self.interim_results => continue,
                Some(item) => return Some(item),
                None => {
                    self.listening.store(false, Ordering::SeqCst);
                    return None;
                }
            }
        }
    }
}

impl Drop for TranscriptStream {
    fn drop(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
    }
}
