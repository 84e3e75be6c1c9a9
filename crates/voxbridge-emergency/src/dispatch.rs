//! Timed side effects that follow activation.
//!
//! Three one-shot actions are scheduled at fixed offsets from activation. Each
//! can be cancelled on its own; deactivation cancels whatever is still pending.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use voxbridge_core::config::EmergencyConfig;
use voxbridge_core::error::Result;

use crate::timer::{TimerId, TimerQueue};

/// One of the side effects triggered by entering `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchAction {
    ShareLocation,
    NotifyContacts,
    AlertServices,
}

impl DispatchAction {
    /// Every action, in firing order for the default offsets.
    pub const ALL: [DispatchAction; 3] = [
        DispatchAction::ShareLocation,
        DispatchAction::NotifyContacts,
        DispatchAction::AlertServices,
    ];
}

impl fmt::Display for DispatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchAction::ShareLocation => write!(f, "share_location"),
            DispatchAction::NotifyContacts => write!(f, "notify_contacts"),
            DispatchAction::AlertServices => write!(f, "alert_services"),
        }
    }
}

/// Schedules and cancels the dispatch actions of one activation.
#[derive(Debug, Clone)]
pub struct DispatchSequencer {
    offsets: [(DispatchAction, Duration); 3],
    pending: Vec<(DispatchAction, TimerId)>,
}

impl DispatchSequencer {
    pub fn new(config: &EmergencyConfig) -> Self {
        Self {
            offsets: [
                (DispatchAction::ShareLocation, config.location_delay()),
                (DispatchAction::NotifyContacts, config.notify_delay()),
                (DispatchAction::AlertServices, config.alert_delay()),
            ],
            pending: Vec::new(),
        }
    }

    /// Offset from activation at which `action` fires.
    pub fn offset(&self, action: DispatchAction) -> Duration {
        self.offsets
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, d)| *d)
            .unwrap_or_default()
    }

    /// Schedule all three actions relative to the queue's current time.
    ///
    /// On failure nothing stays scheduled.
    pub fn start<E>(
        &mut self,
        timers: &mut TimerQueue<E>,
        wrap: impl Fn(DispatchAction) -> E,
    ) -> Result<()> {
        self.cancel_all(timers);
        for (action, delay) in self.offsets {
            match timers.schedule(delay, wrap(action)) {
                Ok(id) => self.pending.push((action, id)),
                Err(e) => {
                    self.cancel_all(timers);
                    return Err(e);
                }
            }
        }
        tracing::debug!(pending = self.pending.len(), "Dispatch actions scheduled");
        Ok(())
    }

    /// Forget an action that has fired.
    pub fn complete(&mut self, id: TimerId) -> Option<DispatchAction> {
        let pos = self.pending.iter().position(|(_, pending)| *pending == id)?;
        Some(self.pending.remove(pos).0)
    }

    /// Cancel one pending action. Returns whether it was still pending.
    pub fn cancel<E>(&mut self, action: DispatchAction, timers: &mut TimerQueue<E>) -> bool {
        match self.pending.iter().position(|(a, _)| *a == action) {
            Some(pos) => {
                let (_, id) = self.pending.remove(pos);
                timers.cancel(id)
            }
            None => false,
        }
    }

    /// Cancel every pending action. Returns how many were cancelled.
    pub fn cancel_all<E>(&mut self, timers: &mut TimerQueue<E>) -> usize {
        self.pending
            .drain(..)
            .filter(|(_, id)| timers.cancel(*id))
            .count()
    }

    pub fn is_pending(&self, action: DispatchAction) -> bool {
        self.pending.iter().any(|(a, _)| *a == action)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
