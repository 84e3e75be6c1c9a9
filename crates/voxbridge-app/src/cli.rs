//! CLI argument definitions for the Voxbridge application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;
use voxbridge_core::config::VoxbridgeConfig;

/// Voxbridge: phrase prediction and emergency alerts for people who communicate by text.
#[derive(Parser, Debug, Default)]
#[command(name = "voxbridge", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Maximum number of candidates shown per prediction.
    #[arg(short = 'm', long = "max-results")]
    pub max_results: Option<usize>,

    /// Emergency countdown length in ticks.
    #[arg(long = "countdown")]
    pub countdown: Option<u32>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOXBRIDGE_CONFIG env var > ~/.voxbridge/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VOXBRIDGE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value. `RUST_LOG` wins over
    /// both when the subscriber is built.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        match self.log_level {
            Some(ref level) => level.clone(),
            None if !config_level.trim().is_empty() => config_level.to_string(),
            None => "info".to_string(),
        }
    }

    /// Write flag overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut VoxbridgeConfig) {
        if let Some(n) = self.max_results {
            config.prediction.max_results = n;
        }
        if let Some(n) = self.countdown {
            config.emergency.countdown_secs = n;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voxbridge").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voxbridge").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "voxbridge",
            "--config",
            "/tmp/vox.toml",
            "-l",
            "debug",
            "--max-results",
            "3",
            "--countdown",
            "2",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/vox.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.max_results, Some(3));
        assert_eq!(args.countdown, Some(2));
    }

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs {
            config: Some(PathBuf::from("explicit.toml")),
            ..CliArgs::default()
        };
        assert_eq!(args.resolve_config_path(), PathBuf::from("explicit.toml"));
    }

    #[test]
    fn test_log_level_priority() {
        let args = CliArgs::default();
        assert_eq!(args.resolve_log_level("warn"), "warn");
        assert_eq!(args.resolve_log_level(""), "info");

        let args = CliArgs {
            log_level: Some("trace".to_string()),
            ..CliArgs::default()
        };
        assert_eq!(args.resolve_log_level("warn"), "trace");
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = VoxbridgeConfig::default();
        let args = CliArgs {
            max_results: Some(3),
            countdown: Some(2),
            ..CliArgs::default()
        };
        args.apply_overrides(&mut config);
        assert_eq!(config.prediction.max_results, 3);
        assert_eq!(config.emergency.countdown_secs, 2);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = VoxbridgeConfig::default();
        CliArgs::default().apply_overrides(&mut config);
        assert_eq!(config.prediction.max_results, 6);
        assert_eq!(config.emergency.countdown_secs, 5);
    }
}
