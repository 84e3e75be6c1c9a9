//! Emergency activation state machine.
//!
//! Valid transitions:
//! - Idle -> Confirming (`request_activation`)
//! - Confirming -> Confirming (countdown tick, remaining > 0)
//! - Confirming -> Active (last tick, or `activate` override)
//! - Confirming -> Idle (`cancel`)
//! - Active -> Idle (`deactivate`)
//!
//! Any state can be forced to Idle by `abort` when the timer queue fails.

use std::time::Duration;

use voxbridge_core::config::EmergencyConfig;
use voxbridge_core::error::{Result, VoxbridgeError};
use voxbridge_core::events::DomainEvent;
use voxbridge_core::types::{EmergencyStatus, EmergencyType, GeoLocation, Timestamp};

use crate::contacts::{
    priority_contacts, ContactDirectory, LocationProvider, NoLocation, StaticDirectory,
};
use crate::dispatch::{DispatchAction, DispatchSequencer};
use crate::session::{DispatchRecord, EmergencySession};
use crate::timer::{TimerId, TimerQueue};

/// Shortest countdown the machine will run, in ticks.
pub const MIN_COUNTDOWN: u32 = 1;

/// Shortest interval between countdown ticks.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Deferred work owned by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    CountdownTick,
    Dispatch(DispatchAction),
}

/// Owns the single emergency session and every timer acting on it.
pub struct EmergencyStateMachine {
    countdown_start: u32,
    tick_interval: Duration,
    session: EmergencySession,
    timers: TimerQueue<TimerEvent>,
    countdown_timer: Option<TimerId>,
    dispatch: DispatchSequencer,
    location: Box<dyn LocationProvider>,
    directory: Box<dyn ContactDirectory>,
    fallback_location: GeoLocation,
    message_override: Option<String>,
    events: Vec<DomainEvent>,
}

impl std::fmt::Debug for EmergencyStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmergencyStateMachine")
            .field("session", &self.session)
            .field("pending_timers", &self.timers.len())
            .field("queued_events", &self.events.len())
            .finish()
    }
}

impl Default for EmergencyStateMachine {
    fn default() -> Self {
        Self::new(&EmergencyConfig::default())
    }
}

impl EmergencyStateMachine {
    /// Create an idle machine using the configured contacts and no live location.
    ///
    /// The countdown is at least one tick and a tick at least one millisecond,
    /// so a session is never seen Confirming with nothing left to count.
    pub fn new(config: &EmergencyConfig) -> Self {
        let countdown_start = config.countdown_secs.max(MIN_COUNTDOWN);
        let tick_interval = config.tick_interval().max(MIN_TICK_INTERVAL);
        if countdown_start != config.countdown_secs || tick_interval != config.tick_interval() {
            tracing::warn!(
                countdown_secs = config.countdown_secs,
                tick_interval_ms = config.tick_interval_ms,
                "Emergency countdown settings raised to their minimum"
            );
        }

        Self {
            countdown_start,
            tick_interval,
            session: EmergencySession::idle(countdown_start),
            timers: TimerQueue::new(),
            countdown_timer: None,
            dispatch: DispatchSequencer::new(config),
            location: Box::new(NoLocation),
            directory: Box::new(StaticDirectory(config.contacts.clone())),
            fallback_location: config.fallback_location.clone(),
            message_override: None,
            events: Vec::new(),
        }
    }

    pub fn with_location_provider(mut self, provider: Box<dyn LocationProvider>) -> Self {
        self.location = provider;
        self
    }

    pub fn with_contact_directory(mut self, directory: Box<dyn ContactDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn session(&self) -> &EmergencySession {
        &self.session
    }

    pub fn status(&self) -> EmergencyStatus {
        self.session.status
    }

    pub fn countdown_start(&self) -> u32 {
        self.countdown_start
    }

    /// Delay from activation to `action`.
    pub fn dispatch_offset(&self, action: DispatchAction) -> Duration {
        self.dispatch.offset(action)
    }

    /// Time left until the next timer is due, if any is pending.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Events queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Start the confirmation countdown for an emergency of `kind`.
    pub fn request_activation(&mut self, kind: EmergencyType) -> Result<()> {
        self.require(EmergencyStatus::Idle, "request activation")?;

        let tick = match self.timers.schedule(self.tick_interval, TimerEvent::CountdownTick) {
            Ok(id) => id,
            Err(e) => {
                self.abort(&e.to_string());
                return Err(e);
            }
        };

        self.countdown_timer = Some(tick);
        self.session.status = EmergencyStatus::Confirming;
        self.session.emergency_type = kind;
        self.session.countdown_remaining = self.countdown_start;
        self.session.message = self
            .message_override
            .clone()
            .unwrap_or_else(|| kind.default_message().to_string());

        tracing::info!(
            emergency_type = %kind,
            countdown = self.countdown_start,
            "Emergency requested, countdown started"
        );
        self.events.push(DomainEvent::EmergencyRequested {
            emergency_type: kind,
            countdown: self.countdown_start,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    /// Abandon the countdown and return to Idle.
    pub fn cancel(&mut self) -> Result<()> {
        self.require(EmergencyStatus::Confirming, "cancel")?;

        self.stop_countdown();
        self.session.reset(self.countdown_start);

        tracing::info!(emergency_type = %self.session.emergency_type, "Emergency cancelled");
        self.events.push(DomainEvent::EmergencyCancelled {
            emergency_type: self.session.emergency_type,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    /// Commit the emergency now, skipping what is left of the countdown.
    ///
    /// A no-op while already Active. Fails from Idle.
    pub fn activate(&mut self) -> Result<()> {
        match self.session.status {
            EmergencyStatus::Active => {
                tracing::debug!("Activate ignored, emergency already active");
                Ok(())
            }
            EmergencyStatus::Confirming => self.commit(true),
            EmergencyStatus::Idle => Err(VoxbridgeError::invalid_state(
                "activate",
                EmergencyStatus::Idle,
            )),
        }
    }

    /// End an active emergency, cancelling pending dispatch actions.
    pub fn deactivate(&mut self) -> Result<()> {
        self.require(EmergencyStatus::Active, "deactivate")?;

        let cancelled = self.dispatch.cancel_all(&mut self.timers);
        self.session.reset(self.countdown_start);

        tracing::info!(
            emergency_type = %self.session.emergency_type,
            cancelled_actions = cancelled,
            "Emergency deactivated"
        );
        self.events.push(DomainEvent::EmergencyDeactivated {
            emergency_type: self.session.emergency_type,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    /// Share the location now instead of waiting for the dispatch timer.
    ///
    /// Returns `false` when it was already shared.
    pub fn share_location(&mut self) -> Result<bool> {
        self.require(EmergencyStatus::Active, "share location")?;
        self.dispatch.cancel(DispatchAction::ShareLocation, &mut self.timers);
        Ok(self.run_share_location(true))
    }

    /// Notify contacts now instead of waiting for the dispatch timer.
    ///
    /// Returns `false` when they were already notified.
    pub fn notify_contacts(&mut self) -> Result<bool> {
        self.require(EmergencyStatus::Active, "notify contacts")?;
        self.dispatch.cancel(DispatchAction::NotifyContacts, &mut self.timers);
        Ok(self.run_notify_contacts(true))
    }

    /// Replace the alert message for this and later emergencies.
    pub fn set_message(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoxbridgeError::Validation(
                "Emergency message must not be empty".to_string(),
            ));
        }
        self.message_override = Some(text.to_string());
        self.session.message = text.to_string();
        Ok(())
    }

    /// Let `elapsed` time pass, firing every timer that comes due in order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now().saturating_add(elapsed);
        while let Some((id, event)) = self.timers.pop_due(until) {
            match event {
                TimerEvent::CountdownTick => self.on_tick(id),
                TimerEvent::Dispatch(action) => self.on_dispatch(id, action),
            }
        }
        self.timers.advance_to(until);
    }

    /// Force the session back to Idle after an unrecoverable fault.
    pub fn abort(&mut self, reason: &str) {
        self.stop_countdown();
        self.dispatch.cancel_all(&mut self.timers);
        let from = self.session.status;
        self.session.reset(self.countdown_start);

        tracing::error!(
            emergency_type = %self.session.emergency_type,
            from = %from,
            reason = %reason,
            "Emergency session aborted"
        );
        self.events.push(DomainEvent::SessionAborted {
            emergency_type: self.session.emergency_type,
            reason: reason.to_string(),
            timestamp: Timestamp::now(),
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require(&self, expected: EmergencyStatus, operation: &'static str) -> Result<()> {
        if self.session.status == expected {
            return Ok(());
        }
        tracing::warn!(
            operation,
            status = %self.session.status,
            "Emergency transition rejected"
        );
        Err(VoxbridgeError::invalid_state(operation, self.session.status))
    }

    fn stop_countdown(&mut self) {
        if let Some(id) = self.countdown_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn on_tick(&mut self, id: TimerId) {
        if self.countdown_timer != Some(id) || self.session.status != EmergencyStatus::Confirming {
            return;
        }
        self.countdown_timer = None;
        self.session.countdown_remaining = self.session.countdown_remaining.saturating_sub(1);

        if self.session.countdown_remaining == 0 {
            if let Err(e) = self.commit(false) {
                tracing::warn!(error = %e, "Activation after countdown failed");
            }
            return;
        }

        match self.timers.schedule(self.tick_interval, TimerEvent::CountdownTick) {
            Ok(next) => {
                self.countdown_timer = Some(next);
                tracing::debug!(remaining = self.session.countdown_remaining, "Countdown tick");
                self.events.push(DomainEvent::CountdownTicked {
                    emergency_type: self.session.emergency_type,
                    remaining: self.session.countdown_remaining,
                    timestamp: Timestamp::now(),
                });
            }
            Err(e) => self.abort(&e.to_string()),
        }
    }

    fn commit(&mut self, skipped_countdown: bool) -> Result<()> {
        self.stop_countdown();
        self.session.status = EmergencyStatus::Active;
        self.session.activated_at = Some(Timestamp::now());

        if let Err(e) = self.dispatch.start(&mut self.timers, TimerEvent::Dispatch) {
            self.abort(&e.to_string());
            return Err(e);
        }

        tracing::info!(
            emergency_type = %self.session.emergency_type,
            skipped_countdown,
            "Emergency activated"
        );
        self.events.push(DomainEvent::EmergencyActivated {
            emergency_type: self.session.emergency_type,
            skipped_countdown,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    fn on_dispatch(&mut self, id: TimerId, action: DispatchAction) {
        if self.dispatch.complete(id).is_none() || !self.session.is_active() {
            return;
        }
        match action {
            DispatchAction::ShareLocation => {
                self.run_share_location(false);
            }
            DispatchAction::NotifyContacts => {
                self.run_notify_contacts(false);
            }
            DispatchAction::AlertServices => self.run_alert_services(),
        }
    }

    fn record(&mut self, action: DispatchAction, manual: bool) -> Timestamp {
        let at = Timestamp::now();
        self.session.dispatch_log.push(DispatchRecord { action, manual, at });
        at
    }

    fn run_share_location(&mut self, manual: bool) -> bool {
        if self.session.location_shared {
            tracing::debug!("Location already shared");
            return false;
        }
        let location = match self.location.current_location() {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(error = %e, "Live location unavailable, sharing fallback");
                self.fallback_location.clone()
            }
        };

        self.session.location_shared = true;
        self.session.shared_location = Some(location.clone());
        let timestamp = self.record(DispatchAction::ShareLocation, manual);

        tracing::info!(location = %location, manual, "Location shared");
        self.events.push(DomainEvent::LocationShared {
            emergency_type: self.session.emergency_type,
            location,
            timestamp,
        });
        true
    }

    fn run_notify_contacts(&mut self, manual: bool) -> bool {
        if self.session.contacts_notified {
            tracing::debug!("Contacts already notified");
            return false;
        }
        self.session.contacts_notified = true;
        let timestamp = self.record(DispatchAction::NotifyContacts, manual);

        tracing::info!(message = %self.session.message, manual, "Emergency contacts notified");
        self.events.push(DomainEvent::ContactsNotified {
            emergency_type: self.session.emergency_type,
            timestamp,
        });
        true
    }

    fn run_alert_services(&mut self) {
        if self.session.services_alerted {
            return;
        }
        let kind = self.session.emergency_type;
        let contacts = match self.directory.contacts() {
            Ok(contacts) => priority_contacts(&contacts, kind),
            Err(e) => {
                tracing::warn!(error = %e, "Contact directory unavailable");
                Vec::new()
            }
        };

        self.session.services_alerted = true;
        self.session.alerted_contacts = contacts;
        let timestamp = self.record(DispatchAction::AlertServices, false);

        let names: Vec<&str> = self
            .session
            .alerted_contacts
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        tracing::info!(emergency_type = %kind, contacts = ?names, "Emergency services alerted");
        self.events.push(DomainEvent::ServicesAlerted {
            emergency_type: kind,
            contact_count: self.session.alerted_contacts.len(),
            timestamp,
        });
    }
}
