//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data, plus the
//! settings file controlling scan cadence and enrichment limits.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netwarden)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/netwarden)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance.
    pub fn get() -> &'static Paths {
        PATHS.get_or_init(|| Self::new().expect("Failed to initialize paths"))
    }

    /// Initialize paths using XDG directories.
    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "netwarden", "netwarden")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port the HTTP API listens on.
    pub listen_port: u16,
    /// Delay between the end of one discovery cycle and the start of the
    /// next, in seconds.
    pub scan_interval_secs: u64,
    /// How often the scheduler checks for a start request while idle,
    /// in seconds.
    pub idle_poll_secs: u64,
    /// Maximum number of hosts per cycle that receive the full port-probe
    /// and classification treatment.
    pub enrichment_cap: usize,
    /// Well-known ports probed during enrichment.
    pub probe_ports: Vec<u16>,
    /// Start scanning as soon as the process comes up.
    pub autostart: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            listen_port: 5001,
            scan_interval_secs: 5,
            idle_poll_secs: 1,
            enrichment_cap: 15,
            probe_ports: vec![22, 80, 443, 445, 8080, 631],
            autostart: false,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = Paths::get();
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&file).map_err(|e| ConfigError::ReadFailed {
            path: file.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = Paths::get();
        let file = paths.settings_file();

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }

    /// Inter-cycle delay as a [`Duration`].
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Idle poll interval as a [`Duration`].
    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.listen_port, 5001);
        assert_eq!(settings.scan_interval_secs, 5);
        assert_eq!(settings.enrichment_cap, 15);
        assert_eq!(settings.probe_ports, vec![22, 80, 443, 445, 8080, 631]);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.enrichment_cap, settings.enrichment_cap);
        assert_eq!(parsed.probe_ports, settings.probe_ports);
    }

    #[test]
    fn test_load_from_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = AppSettings::default();
        settings.scan_interval_secs = 30;
        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.scan_interval_secs, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"listen_port": 8088}"#).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.listen_port, 8088);
        assert_eq!(loaded.enrichment_cap, 15);
    }
}
