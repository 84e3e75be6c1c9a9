//! End-to-end flows through the communicator with a config loaded from disk.

use std::io::Write;
use std::time::Duration;

use voxbridge_app::{CliArgs, Command, Communicator};
use voxbridge_core::config::VoxbridgeConfig;
use voxbridge_core::types::{EmergencyStatus, EmergencyType};
use voxbridge_speech::SpeechController;

fn load(toml: &str) -> VoxbridgeConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();
    VoxbridgeConfig::load(file.path()).unwrap()
}

fn communicator(config: &VoxbridgeConfig) -> Communicator {
    Communicator::new(config, SpeechController::new(config.speech.clone()))
}

#[test]
fn test_config_file_shapes_prediction() {
    let config = load(
        r#"
[prediction]
max_results = 2
"#,
    );
    let mut comm = communicator(&config);
    comm.on_text_changed("Where is");
    let texts: Vec<_> = comm.candidates().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["the bathroom", "water"]);
}

#[test]
fn test_custom_triggers_from_config() {
    let config = load(
        r#"
[prediction]
urgency_triggers = ["sos"]
"#,
    );
    let mut comm = communicator(&config);
    comm.on_text_changed("help");
    assert!(comm.candidates().is_empty());
    comm.on_text_changed("SOS");
    assert_eq!(comm.candidates().len(), 5);
}

#[test]
fn test_cli_countdown_override_drives_session() {
    let mut config = load(
        r#"
[emergency]
tick_interval_ms = 200
location_delay_ms = 100
notify_delay_ms = 200
alert_delay_ms = 300
"#,
    );
    let args = CliArgs {
        countdown: Some(2),
        ..CliArgs::default()
    };
    args.apply_overrides(&mut config);
    let mut comm = communicator(&config);

    assert_eq!(
        Command::parse(":sos fire").unwrap(),
        Command::Sos(EmergencyType::Fire)
    );
    comm.request_emergency(EmergencyType::Fire).unwrap();
    comm.advance(Duration::from_millis(200));
    assert_eq!(comm.session().status, EmergencyStatus::Confirming);
    assert_eq!(comm.session().countdown_remaining, 1);

    comm.advance(Duration::from_millis(200));
    assert!(comm.session().is_active());
    assert_eq!(comm.session().message, EmergencyType::Fire.default_message());

    comm.advance(Duration::from_millis(300));
    let session = comm.session();
    assert!(session.location_shared && session.contacts_notified && session.services_alerted);
    assert!(session
        .alerted_contacts
        .iter()
        .all(|c| c.kind == EmergencyType::Fire || c.priority == 1));
}

#[test]
fn test_typing_then_picking_builds_sentence() {
    let config = VoxbridgeConfig::default();
    let mut comm = communicator(&config);

    comm.on_text_changed("Thank you");
    assert_eq!(comm.choose(1).unwrap(), "Thank you for your help");
    comm.on_text_changed("Goodbye");
    comm.choose(0).unwrap();

    let recent: Vec<_> = comm.recent().collect();
    assert_eq!(recent, vec!["Goodbye see you later", "Thank you for your help"]);
}

#[test]
fn test_rejected_transitions_leave_session_alone() {
    let config = VoxbridgeConfig::default();
    let mut comm = communicator(&config);

    assert!(comm.cancel_emergency().is_err());
    assert!(comm.deactivate_emergency().is_err());
    assert!(comm.activate_now().is_err());
    assert!(comm.share_location().is_err());
    assert!(comm.session().is_idle());
    assert!(comm.session().is_consistent(config.emergency.countdown_secs));
    assert!(comm.drain_events().is_empty());
}
