//! Emergency activation workflow for Voxbridge.
//!
//! A single `EmergencySession` moves Idle -> Confirming -> Active -> Idle.
//! The countdown and the dispatch actions are deferred callbacks on a
//! `TimerQueue` that the caller drains with `advance`, so every transition
//! happens on the caller's thread, one at a time.

pub mod contacts;
pub mod dispatch;
pub mod machine;
pub mod session;
pub mod timer;

pub use contacts::{
    priority_contacts, ContactDirectory, FixedLocation, LocationProvider, NoLocation,
    StaticDirectory,
};
pub use dispatch::{DispatchAction, DispatchSequencer};
pub use machine::EmergencyStateMachine;
pub use session::{DispatchRecord, EmergencySession};
pub use timer::{TimerId, TimerQueue};
