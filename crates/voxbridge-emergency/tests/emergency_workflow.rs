//! End-to-end emergency workflow scenarios driven through the public API.

use std::time::Duration;

use voxbridge_core::config::EmergencyConfig;
use voxbridge_core::error::VoxbridgeError;
use voxbridge_core::types::{EmergencyContact, EmergencyStatus, EmergencyType};
use voxbridge_emergency::{
    ContactDirectory, DispatchAction, EmergencyStateMachine, StaticDirectory,
};

struct BrokenDirectory;

impl ContactDirectory for BrokenDirectory {
    fn contacts(&self) -> voxbridge_core::Result<Vec<EmergencyContact>> {
        Err(VoxbridgeError::CapabilityUnavailable("contacts".to_string()))
    }
}

fn fast_config() -> EmergencyConfig {
    EmergencyConfig {
        countdown_secs: 3,
        tick_interval_ms: 100,
        location_delay_ms: 50,
        notify_delay_ms: 150,
        alert_delay_ms: 250,
        ..EmergencyConfig::default()
    }
}

#[test]
fn test_liveness_within_start_ticks() {
    for kind in EmergencyType::ALL {
        let mut machine = EmergencyStateMachine::default();
        machine.request_activation(kind).unwrap();
        for _ in 0..machine.countdown_start() {
            machine.advance(Duration::from_secs(1));
        }
        assert_eq!(machine.status(), EmergencyStatus::Active, "{}", kind);
    }
}

#[test]
fn test_single_large_step_runs_whole_workflow() {
    let mut machine = EmergencyStateMachine::new(&fast_config());
    machine.request_activation(EmergencyType::Police).unwrap();
    machine.advance(Duration::from_secs(60));

    let session = machine.session();
    assert!(session.is_active());
    assert!(session.location_shared && session.contacts_notified && session.services_alerted);
    for action in DispatchAction::ALL {
        assert_eq!(session.dispatch_count(action), 1);
    }
    let names: Vec<&str> = session
        .alerted_contacts
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ambulance", "Police", "Fire Department"]);
}

#[test]
fn test_cancel_at_every_tick_leaves_no_dispatch() {
    let config = fast_config();
    for ticks in 0..config.countdown_secs {
        let mut machine = EmergencyStateMachine::new(&config);
        machine.request_activation(EmergencyType::Medical).unwrap();
        machine.advance(config.tick_interval() * ticks);
        machine.cancel().unwrap();
        machine.advance(Duration::from_secs(10));

        let session = machine.session();
        assert!(session.is_idle());
        assert_eq!(session.countdown_remaining, config.countdown_secs);
        assert!(!session.location_shared);
        assert!(!session.contacts_notified);
        assert!(!session.services_alerted);
        assert!(session.is_consistent(config.countdown_secs));
    }
}

#[test]
fn test_deactivate_between_dispatch_actions() {
    let config = fast_config();
    let mut machine = EmergencyStateMachine::new(&config);
    machine.request_activation(EmergencyType::Fire).unwrap();
    machine.activate().unwrap();
    machine.advance(Duration::from_millis(160));
    assert!(machine.session().contacts_notified);

    machine.deactivate().unwrap();
    machine.advance(Duration::from_secs(10));
    assert!(!machine.session().services_alerted);
    assert!(machine.session().alerted_contacts.is_empty());
}

#[test]
fn test_invariants_hold_through_random_walk() {
    let config = fast_config();
    let mut machine = EmergencyStateMachine::new(&config);
    // Fixed pseudo-random walk over operations and time steps.
    let mut seed: u64 = 0x5eed;
    for _ in 0..500 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        match (seed >> 33) % 7 {
            0 => {
                let _ = machine.request_activation(EmergencyType::ALL[(seed % 4) as usize]);
            }
            1 => {
                let _ = machine.cancel();
            }
            2 => {
                let _ = machine.activate();
            }
            3 => {
                let _ = machine.deactivate();
            }
            4 => {
                let _ = machine.share_location();
            }
            5 => {
                let _ = machine.notify_contacts();
            }
            _ => machine.advance(Duration::from_millis((seed >> 40) % 200)),
        }
        let session = machine.session();
        assert!(session.is_consistent(config.countdown_secs), "{:?}", session);
        for action in DispatchAction::ALL {
            assert!(session.dispatch_count(action) <= 1);
        }
    }
}

#[test]
fn test_directory_failure_still_marks_alerted() {
    let mut machine =
        EmergencyStateMachine::default().with_contact_directory(Box::new(BrokenDirectory));
    machine.request_activation(EmergencyType::Medical).unwrap();
    machine.activate().unwrap();
    machine.advance(Duration::from_secs(5));

    assert!(machine.session().services_alerted);
    assert!(machine.session().alerted_contacts.is_empty());
}

#[test]
fn test_custom_directory_filters_by_type() {
    let directory = StaticDirectory(vec![
        EmergencyContact::new("Fire Brigade", "112", EmergencyType::Fire, 2),
        EmergencyContact::new("Nurse", "555", EmergencyType::Medical, 2),
        EmergencyContact::new("Dispatcher", "911", EmergencyType::Police, 1),
    ]);
    let mut machine = EmergencyStateMachine::default().with_contact_directory(Box::new(directory));
    machine.request_activation(EmergencyType::Fire).unwrap();
    machine.activate().unwrap();
    machine.advance(Duration::from_secs(5));

    let names: Vec<&str> = machine
        .session()
        .alerted_contacts
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Fire Brigade", "Dispatcher"]);
}

#[test]
fn test_independent_machines_do_not_share_state() {
    let mut a = EmergencyStateMachine::default();
    let b = EmergencyStateMachine::default();
    a.request_activation(EmergencyType::Medical).unwrap();
    assert_eq!(a.status(), EmergencyStatus::Confirming);
    assert_eq!(b.status(), EmergencyStatus::Idle);
}
