//! Configuration settings for Blikk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub download: DownloadSettings,
    pub analyzer: AnalyzerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Repository root all file tools are sandboxed to.
    pub root_dir: String,
    /// Directory for staging temporary downloads.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
            temp_dir: "/tmp/blikk".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Video download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Seconds the merge-capability probe may run before assuming absence.
    pub probe_timeout_seconds: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            probe_timeout_seconds: 5,
        }
    }
}

/// Multimodal analyzer settings.
///
/// The project is intentionally not validated at load time; a missing value
/// surfaces as a configuration error on the first analysis attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Cloud project identifier. Falls back to GOOGLE_CLOUD_PROJECT.
    pub project: Option<String>,
    /// Model location/region. Overridable via GOOGLE_CLOUD_LOCATION.
    pub location: String,
    /// Model to use for video understanding.
    pub model: String,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            project: None,
            location: "us-central1".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom analysis prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::BlikkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blikk")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded repository root path.
    pub fn root_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.root_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.general.root_dir, ".");
        assert_eq!(settings.analyzer.location, "us-central1");
        assert_eq!(settings.analyzer.project, None);
        assert_eq!(settings.download.probe_timeout_seconds, 5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            root_dir = "/srv/repo"

            [analyzer]
            project = "my-project"
            "#,
        )
        .unwrap();

        assert_eq!(settings.general.root_dir, "/srv/repo");
        assert_eq!(settings.analyzer.project.as_deref(), Some("my-project"));
        assert_eq!(settings.analyzer.model, "gemini-2.0-flash-exp");
        assert_eq!(settings.general.temp_dir, "/tmp/blikk");
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.analyzer.project = Some("roundtrip".into());
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.analyzer.project.as_deref(), Some("roundtrip"));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = PathBuf::from("/nonexistent/blikk/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.general.root_dir, ".");
    }
}
