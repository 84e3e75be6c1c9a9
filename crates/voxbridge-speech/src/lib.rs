//! Speech capability boundary for Voxbridge.
//!
//! Synthesis and recognition are external capabilities. The core only hands
//! them text or settings and reacts to their completion and error signals.

pub mod capability;
pub mod controller;

pub use capability::{SpeechRecognizer, SpeechSynthesizer, Transcript};
pub use controller::{SpeechController, TranscriptStream};
