//! Voxbridge application layer: CLI parsing, the interactive command set and
//! the communicator that ties prediction, speech and the emergency workflow
//! together.

pub mod cli;
pub mod command;
pub mod communicator;
pub mod console;

pub use cli::CliArgs;
pub use command::Command;
pub use communicator::Communicator;
pub use console::{ConsoleRecognizer, ConsoleSynthesizer};
