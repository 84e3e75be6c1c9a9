//! The emergency session value.

use serde::{Deserialize, Serialize};
use voxbridge_core::types::{
    EmergencyContact, EmergencyStatus, EmergencyType, GeoLocation, Timestamp,
};

use crate::dispatch::DispatchAction;

/// A dispatch side effect that actually ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub action: DispatchAction,
    /// True when the user triggered it instead of the timer.
    pub manual: bool,
    pub at: Timestamp,
}

/// Progress of the emergency workflow.
///
/// Only `EmergencyStateMachine` mutates a session; callers get a shared
/// reference or a cloned snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencySession {
    pub status: EmergencyStatus,
    pub emergency_type: EmergencyType,
    /// Ticks left while confirming. Ignored once active.
    pub countdown_remaining: u32,
    pub location_shared: bool,
    pub contacts_notified: bool,
    pub services_alerted: bool,
    pub activated_at: Option<Timestamp>,
    /// Alert text sent with the notifications.
    pub message: String,
    pub shared_location: Option<GeoLocation>,
    pub alerted_contacts: Vec<EmergencyContact>,
    pub dispatch_log: Vec<DispatchRecord>,
}

impl EmergencySession {
    /// A fresh idle session with the countdown armed at `countdown_start`.
    pub fn idle(countdown_start: u32) -> Self {
        let emergency_type = EmergencyType::default();
        Self {
            status: EmergencyStatus::Idle,
            emergency_type,
            countdown_remaining: countdown_start,
            location_shared: false,
            contacts_notified: false,
            services_alerted: false,
            activated_at: None,
            message: emergency_type.default_message().to_string(),
            shared_location: None,
            alerted_contacts: Vec::new(),
            dispatch_log: Vec::new(),
        }
    }

    /// Re-arm to idle, keeping the last emergency type and message.
    pub(crate) fn reset(&mut self, countdown_start: u32) {
        self.status = EmergencyStatus::Idle;
        self.countdown_remaining = countdown_start;
        self.location_shared = false;
        self.contacts_notified = false;
        self.services_alerted = false;
        self.activated_at = None;
        self.shared_location = None;
        self.alerted_contacts.clear();
        self.dispatch_log.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.status == EmergencyStatus::Idle
    }

    pub fn is_active(&self) -> bool {
        self.status == EmergencyStatus::Active
    }

    /// Number of dispatch records for `action`.
    pub fn dispatch_count(&self, action: DispatchAction) -> usize {
        self.dispatch_log.iter().filter(|r| r.action == action).count()
    }

    /// Whether the status-dependent invariants hold.
    pub fn is_consistent(&self, countdown_start: u32) -> bool {
        match self.status {
            EmergencyStatus::Idle => {
                !self.location_shared
                    && !self.contacts_notified
                    && !self.services_alerted
                    && self.countdown_remaining == countdown_start
                    && self.activated_at.is_none()
            }
            EmergencyStatus::Confirming => {
                !self.location_shared
                    && !self.contacts_notified
                    && !self.services_alerted
                    && self.countdown_remaining > 0
                    && self.activated_at.is_none()
            }
            EmergencyStatus::Active => self.activated_at.is_some(),
        }
    }
}
