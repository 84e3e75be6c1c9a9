use serde::{Deserialize, Serialize};

use crate::types::{EmergencyType, GeoLocation, Timestamp};

/// Domain events emitted by the emergency workflow.
///
/// Events are queued after every state change and drained by the presentation
/// layer, so it can render progress without polling the timers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DomainEvent {
    /// The user asked for an emergency; the countdown started.
    EmergencyRequested {
        emergency_type: EmergencyType,
        countdown: u32,
        timestamp: Timestamp,
    },

    /// One countdown tick elapsed without reaching zero.
    CountdownTicked {
        emergency_type: EmergencyType,
        remaining: u32,
        timestamp: Timestamp,
    },

    /// The countdown was cancelled before activation.
    EmergencyCancelled {
        emergency_type: EmergencyType,
        timestamp: Timestamp,
    },

    /// The emergency was committed, by timeout or explicit override.
    EmergencyActivated {
        emergency_type: EmergencyType,
        skipped_countdown: bool,
        timestamp: Timestamp,
    },

    /// The location dispatch ran.
    LocationShared {
        emergency_type: EmergencyType,
        location: GeoLocation,
        timestamp: Timestamp,
    },

    /// The contact notification dispatch ran.
    ContactsNotified {
        emergency_type: EmergencyType,
        timestamp: Timestamp,
    },

    /// The emergency services were alerted with the filtered contact list.
    ServicesAlerted {
        emergency_type: EmergencyType,
        contact_count: usize,
        timestamp: Timestamp,
    },

    /// The user ended an active emergency.
    EmergencyDeactivated {
        emergency_type: EmergencyType,
        timestamp: Timestamp,
    },

    /// The session was forced back to idle after an unrecoverable fault.
    SessionAborted {
        emergency_type: EmergencyType,
        reason: String,
        timestamp: Timestamp,
    },
}

impl DomainEvent {
    /// Short machine-readable name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::EmergencyRequested { .. } => "emergency_requested",
            DomainEvent::CountdownTicked { .. } => "countdown_ticked",
            DomainEvent::EmergencyCancelled { .. } => "emergency_cancelled",
            DomainEvent::EmergencyActivated { .. } => "emergency_activated",
            DomainEvent::LocationShared { .. } => "location_shared",
            DomainEvent::ContactsNotified { .. } => "contacts_notified",
            DomainEvent::ServicesAlerted { .. } => "services_alerted",
            DomainEvent::EmergencyDeactivated { .. } => "emergency_deactivated",
            DomainEvent::SessionAborted { .. } => "session_aborted",
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            DomainEvent::EmergencyRequested { timestamp, .. }
            | DomainEvent::CountdownTicked { timestamp, .. }
            | DomainEvent::EmergencyCancelled { timestamp, .. }
            | DomainEvent::EmergencyActivated { timestamp, .. }
            | DomainEvent::LocationShared { timestamp, .. }
            | DomainEvent::ContactsNotified { timestamp, .. }
            | DomainEvent::ServicesAlerted { timestamp, .. }
            | DomainEvent::EmergencyDeactivated { timestamp, .. }
            | DomainEvent::SessionAborted { timestamp, .. } => *timestamp,
        }
    }
}
