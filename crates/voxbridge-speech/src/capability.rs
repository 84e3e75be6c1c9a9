//! Speech capability trait definitions.

use async_trait::async_trait;
use tokio::sync::mpsc;
use voxbridge_core::config::SpeechConfig;
use voxbridge_core::error::Result;

/// A partial or final recognition result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub is_final: bool,
}

impl Transcript {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Turns text into audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, resolving when playback completes or fails.
    async fn speak(&self, text: &str, voice: &SpeechConfig) -> Result<()>;

    /// Interrupt any utterance in progress.
    fn stop(&self) {}
}

/// Turns microphone audio into transcripts.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start a recognition session. The channel closes when the session ends.
    async fn listen(&self, settings: &SpeechConfig) -> Result<mpsc::Receiver<Result<Transcript>>>;
}
