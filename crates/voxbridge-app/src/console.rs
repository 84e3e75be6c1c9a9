//! Terminal stand-ins for the speech engines.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use voxbridge_core::config::SpeechConfig;
use voxbridge_core::error::{Result, VoxbridgeError};
use voxbridge_speech::{SpeechRecognizer, SpeechSynthesizer, Transcript};

/// Transcripts buffered per dictated line.
const DICTATION_BUFFER: usize = 32;

/// Writes each utterance as a line instead of playing audio.
pub struct ConsoleSynthesizer {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl ConsoleSynthesizer {
    pub fn stdout() -> Self {
        Self::new(Arc::new(Mutex::new(std::io::stdout())))
    }

    pub fn new(out: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self { out }
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    async fn speak(&self, text: &str, voice: &SpeechConfig) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| VoxbridgeError::CapabilityUnavailable("console output".to_string()))?;
        writeln!(
            out,
            "[speaking {} rate={:.1} pitch={:.1} volume={:.1}] {}",
            voice.language, voice.rate, voice.pitch, voice.volume, text
        )?;
        out.flush()?;
        Ok(())
    }
}

/// Treats a typed line as one spoken utterance.
///
/// `listen` opens a session; `dictate` feeds it a line as word-by-word
/// partial transcripts followed by the final text, then ends the session.
#[derive(Clone, Default)]
pub struct ConsoleRecognizer {
    session: Arc<Mutex<Option<mpsc::Sender<Result<Transcript>>>>>,
}

impl ConsoleRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is waiting for a line.
    pub fn is_open(&self) -> bool {
        self.session
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }

    /// Deliver `line` to the open session. Returns `false` when none is open.
    pub fn dictate(&self, line: &str) -> bool {
        let Some(tx) = self.session.lock().ok().and_then(|mut slot| slot.take()) else {
            return false;
        };

        let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let text = words.join(" ");
        tokio::spawn(async move {
            for n in 1..words.len() {
                let partial = Transcript::partial(words[..n].join(" "));
                if tx.send(Ok(partial)).await.is_err() {
                    return;
                }
            }
            if !text.is_empty() {
                let _ = tx.send(Ok(Transcript::final_text(text))).await;
            }
        });
        true
    }
}

#[async_trait]
impl SpeechRecognizer for ConsoleRecognizer {
    async fn listen(&self, settings: &SpeechConfig) -> Result<mpsc::Receiver<Result<Transcript>>> {
        let (tx, rx) = mpsc::channel(DICTATION_BUFFER);
        let mut slot = self
            .session
            .lock()
            .map_err(|_| VoxbridgeError::CapabilityUnavailable("console input".to_string()))?;
        *slot = Some(tx);
        tracing::debug!(language = %settings.language, "Console dictation open");
        Ok(rx)
    }
}
