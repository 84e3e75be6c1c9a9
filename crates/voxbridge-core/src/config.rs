use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoxbridgeError};
use crate::types::{EmergencyContact, EmergencyType, GeoLocation};

/// Top-level configuration for Voxbridge.
///
/// Loaded from `~/.voxbridge/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxbridgeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub emergency: EmergencyConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl VoxbridgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoxbridgeConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.prediction.max_results == 0 {
            return Err(VoxbridgeError::Config(
                "prediction.max_results must be at least 1".to_string(),
            ));
        }
        if self.emergency.countdown_secs == 0 {
            return Err(VoxbridgeError::Config(
                "emergency.countdown_secs must be at least 1".to_string(),
            ));
        }
        if self.emergency.tick_interval_ms == 0 {
            return Err(VoxbridgeError::Config(
                "emergency.tick_interval_ms must be at least 1".to_string(),
            ));
        }
        if !(0.1..=10.0).contains(&self.speech.rate) {
            return Err(VoxbridgeError::Config(format!(
                "speech.rate {} outside 0.1..=10",
                self.speech.rate
            )));
        }
        if !(0.0..=2.0).contains(&self.speech.pitch) {
            return Err(VoxbridgeError::Config(format!(
                "speech.pitch {} outside 0..=2",
                self.speech.pitch
            )));
        }
        if !(0.0..=1.0).contains(&self.speech.volume) {
            return Err(VoxbridgeError::Config(format!(
                "speech.volume {} outside 0..=1",
                self.speech.volume
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Phrase prediction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Maximum number of candidates returned per prediction.
    pub max_results: usize,
    /// Substrings (case-insensitive) that pull in the urgent phrase list.
    pub urgency_triggers: Vec<String>,
    /// How many recently composed phrases to remember.
    pub recent_capacity: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_results: 6,
            urgency_triggers: vec!["help".to_string(), "emergency".to_string()],
            recent_capacity: 10,
        }
    }
}

/// Emergency workflow timing and contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    /// Countdown start value, in ticks.
    pub countdown_secs: u32,
    /// Interval between countdown ticks.
    pub tick_interval_ms: u64,
    /// Delay from activation to the location share.
    pub location_delay_ms: u64,
    /// Delay from activation to the contact notification.
    pub notify_delay_ms: u64,
    /// Delay from activation to the emergency service alert.
    pub alert_delay_ms: u64,
    /// Contact directory, in priority-filter order.
    pub contacts: Vec<EmergencyContact>,
    /// Position reported when no live location is available.
    pub fallback_location: GeoLocation,
}

impl EmergencyConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn location_delay(&self) -> Duration {
        Duration::from_millis(self.location_delay_ms)
    }

    pub fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_delay_ms)
    }

    pub fn alert_delay(&self) -> Duration {
        Duration::from_millis(self.alert_delay_ms)
    }
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 5,
            tick_interval_ms: 1000,
            location_delay_ms: 1000,
            notify_delay_ms: 3000,
            alert_delay_ms: 5000,
            contacts: default_contacts(),
            fallback_location: GeoLocation::default(),
        }
    }
}

fn default_contacts() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact::new("Ambulance", "999", EmergencyType::Medical, 1),
        EmergencyContact::new("Police", "999", EmergencyType::Police, 1),
        EmergencyContact::new("Fire Department", "999", EmergencyType::Fire, 1),
        EmergencyContact::new("Dr. Wanjiku", "+254 712 345 678", EmergencyType::Medical, 2),
        EmergencyContact::new("Family - Mom", "+254 723 456 789", EmergencyType::Personal, 2),
        EmergencyContact::new("Neighbor John", "+254 734 567 890", EmergencyType::Personal, 3),
    ]
}

/// Voice settings handed to the speech capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// BCP 47 language tag for recognition and synthesis.
    pub language: String,
    /// Whether recognition should report partial transcripts.
    pub interim_results: bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
            language: "en-KE".to_string(),
            interim_results: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = VoxbridgeConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.prediction.max_results, 6);
        assert_eq!(config.prediction.urgency_triggers, vec!["help", "emergency"]);
        assert_eq!(config.prediction.recent_capacity, 10);
        assert_eq!(config.emergency.countdown_secs, 5);
        assert_eq!(config.emergency.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.emergency.location_delay(), Duration::from_secs(1));
        assert_eq!(config.emergency.notify_delay(), Duration::from_secs(3));
        assert_eq!(config.emergency.alert_delay(), Duration::from_secs(5));
        assert_eq!(config.emergency.contacts.len(), 6);
        assert_eq!(config.speech.language, "en-KE");
        assert!((config.speech.rate - 0.8).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
[general]
log_level = "debug"

[prediction]
max_results = 4
urgency_triggers = ["help", "sos"]

[emergency]
countdown_secs = 3
alert_delay_ms = 7000

[[emergency.contacts]]
name = "Clinic"
number = "112"
kind = "medical"
priority = 1

[speech]
rate = 1.2
language = "sw-KE"
"#,
        );

        let config = VoxbridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.prediction.max_results, 4);
        assert_eq!(config.prediction.urgency_triggers, vec!["help", "sos"]);
        assert_eq!(config.prediction.recent_capacity, 10);
        assert_eq!(config.emergency.countdown_secs, 3);
        assert_eq!(config.emergency.alert_delay_ms, 7000);
        assert_eq!(config.emergency.notify_delay_ms, 3000);
        assert_eq!(config.emergency.contacts.len(), 1);
        assert_eq!(config.emergency.contacts[0].kind, EmergencyType::Medical);
        assert_eq!(config.speech.language, "sw-KE");
        assert!((config.speech.pitch - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[general]\nlog_level = \"warn\"\n");
        let config = VoxbridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.prediction.max_results, 6);
        assert_eq!(config.emergency.contacts.len(), 6);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = VoxbridgeConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.prediction.max_results, 6);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is not [[ toml");
        let result = VoxbridgeConfig::load(file.path());
        assert!(matches!(result, Err(VoxbridgeError::Config(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = create_temp_config("[prediction]\nmax_results = 0\n");
        assert!(matches!(
            VoxbridgeConfig::load(file.path()),
            Err(VoxbridgeError::Config(_))
        ));

        let file = create_temp_config("[emergency]\ncountdown_secs = 0\n");
        assert!(VoxbridgeConfig::load(file.path()).is_err());

        let file = create_temp_config("[speech]\nvolume = 1.5\n");
        assert!(VoxbridgeConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validate_each_bound() {
        let mut config = VoxbridgeConfig::default();
        config.emergency.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = VoxbridgeConfig::default();
        config.speech.rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = VoxbridgeConfig::default();
        config.speech.pitch = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = VoxbridgeConfig::default();
        config.prediction.max_results = 3;
        config.emergency.countdown_secs = 10;
        config.save(&path).unwrap();

        let loaded = VoxbridgeConfig::load(&path).unwrap();
        assert_eq!(loaded.prediction.max_results, 3);
        assert_eq!(loaded.emergency.countdown_secs, 10);
        assert_eq!(loaded.emergency.contacts, config.emergency.contacts);
        assert_eq!(loaded.speech, config.speech);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: VoxbridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.emergency.fallback_location, GeoLocation::default());
    }
}
