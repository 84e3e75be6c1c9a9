pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::VoxbridgeConfig;
pub use error::{Result, VoxbridgeError};
pub use types::*;
