//! Contextual phrase prediction for Voxbridge.
//!
//! Turns a partially typed utterance into ranked continuations by merging the
//! built-in phrase models, the user's own phrases, and the urgent phrase list.

pub mod context;
pub mod engine;
pub mod model;
pub mod store;

pub use context::PredictionContext;
pub use engine::{compose_selection, PredictionEngine};
pub use model::{PhraseModel, UrgentPhrase, UrgentPriority};
pub use store::{CustomPhrase, PhraseModelStore};
