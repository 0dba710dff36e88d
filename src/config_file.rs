//! Configuration file handling for the override table and host sources.
//!
//! A configuration is a JSON document; every field has a default so a partial
//! file (or no file at all) is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::CapabilityKind;

/// Environment variable naming a configuration file when `--config` is absent
pub const CONFIG_ENV_VAR: &str = "DEVSPEC_CONFIG";

/// Pre-set capability strings supplied by build or deployment configuration.
///
/// An entry that is present and non-empty replaces the whole source chain
/// for its capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideTable {
    pub cpu_model: Option<String>,
    pub screen_resolution: Option<String>,
    pub battery_info: Option<String>,
    pub storage_info: Option<String>,
    pub ram_info: Option<String>,
}

impl OverrideTable {
    /// Override for `kind`, only if it is set and non-empty.
    pub fn get(&self, kind: CapabilityKind) -> Option<&str> {
        let value = match kind {
            CapabilityKind::ProcessorModel => self.cpu_model.as_deref(),
            CapabilityKind::ScreenResolution => self.screen_resolution.as_deref(),
            CapabilityKind::BatteryCapacity => self.battery_info.as_deref(),
            CapabilityKind::StorageSize => self.storage_info.as_deref(),
            CapabilityKind::RamSize => self.ram_info.as_deref(),
            CapabilityKind::StorageAndRamSummary | CapabilityKind::DeviceName => None,
        };
        value.filter(|v| !v.is_empty())
    }

    /// Builder-style setter, mostly for tests and embedding.
    pub fn with(mut self, kind: CapabilityKind, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match kind {
            CapabilityKind::ProcessorModel => self.cpu_model = value,
            CapabilityKind::ScreenResolution => self.screen_resolution = value,
            CapabilityKind::BatteryCapacity => self.battery_info = value,
            CapabilityKind::StorageSize => self.storage_info = value,
            CapabilityKind::RamSize => self.ram_info = value,
            CapabilityKind::StorageAndRamSummary | CapabilityKind::DeviceName => {
                tracing::warn!("{} has no override entry, ignoring", kind);
            }
        }
        self
    }
}

/// Where the Linux host implementations read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Mount point of the data partition measured for storage size
    pub data_dir: PathBuf,
    pub meminfo_path: PathBuf,
    /// build.prop-style files, searched in order
    pub property_files: Vec<PathBuf>,
    /// Processor model properties, highest priority first
    pub cpu_properties: Vec<String>,
    /// Device model properties, highest priority first
    pub model_properties: Vec<String>,
    pub drm_dir: PathBuf,
    pub power_supply_dir: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data"),
            meminfo_path: PathBuf::from("/proc/meminfo"),
            property_files: vec![
                PathBuf::from("/system/build.prop"),
                PathBuf::from("/vendor/build.prop"),
                PathBuf::from("/product/etc/build.prop"),
            ],
            cpu_properties: vec!["ro.everest.cpu".to_string(), "ro.board.platform".to_string()],
            model_properties: vec!["ro.product.system.model".to_string()],
            drm_dir: PathBuf::from("/sys/class/drm"),
            power_supply_dir: PathBuf::from("/sys/class/power_supply"),
        }
    }
}

/// Complete devspec configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevspecConfig {
    pub overrides: OverrideTable,
    pub host: HostConfig,
}

impl DevspecConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Load from `path`, else from `DEVSPEC_CONFIG`, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.trim().is_empty() => {
                tracing::debug!("Using configuration from {}={}", CONFIG_ENV_VAR, env_path);
                Self::load_from_file(env_path.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let host = &self.host;

        if host.cpu_properties.is_empty() {
            anyhow::bail!("cpu_properties must name at least one property");
        }
        if host.model_properties.is_empty() {
            anyhow::bail!("model_properties must name at least one property");
        }
        for name in host.cpu_properties.iter().chain(&host.model_properties) {
            if name.trim().is_empty() {
                anyhow::bail!("Property names must not be empty");
            }
            if name.chars().any(|c| c.is_whitespace() || c == '=') {
                anyhow::bail!("Invalid property name {:?}", name);
            }
        }

        for (field, path) in [
            ("data_dir", &host.data_dir),
            ("meminfo_path", &host.meminfo_path),
            ("drm_dir", &host.drm_dir),
            ("power_supply_dir", &host.power_supply_dir),
        ] {
            if !path.is_absolute() {
                anyhow::bail!("{} must be an absolute path, got {:?}", field, path);
            }
        }

        // Whitespace-only overrides would be shown verbatim
        let overrides = &self.overrides;
        for (field, value) in [
            ("cpu_model", &overrides.cpu_model),
            ("screen_resolution", &overrides.screen_resolution),
            ("battery_info", &overrides.battery_info),
            ("storage_info", &overrides.storage_info),
            ("ram_info", &overrides.ram_info),
        ] {
            if let Some(v) = value {
                if !v.is_empty() && v.trim().is_empty() {
                    anyhow::bail!("Override {} is whitespace only", field);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_override_is_unset() {
        let table = OverrideTable {
            cpu_model: Some(String::new()),
            ram_info: Some("12 GB".to_string()),
            ..Default::default()
        };
        assert_eq!(table.get(CapabilityKind::ProcessorModel), None);
        assert_eq!(table.get(CapabilityKind::RamSize), Some("12 GB"));
        assert_eq!(table.get(CapabilityKind::StorageAndRamSummary), None);
    }

    #[test]
    fn test_with_sets_matching_field() {
        let table = OverrideTable::default()
            .with(CapabilityKind::ScreenResolution, "1080 x 2400")
            .with(CapabilityKind::DeviceName, "ignored");
        assert_eq!(table.screen_resolution.as_deref(), Some("1080 x 2400"));
        assert_eq!(table.get(CapabilityKind::DeviceName), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DevspecConfig =
            serde_json::from_str(r#"{"overrides": {"cpu_model": "Snapdragon 8 Gen 2"}}"#).unwrap();
        assert_eq!(
            config.overrides.get(CapabilityKind::ProcessorModel),
            Some("Snapdragon 8 Gen 2")
        );
        assert_eq!(config.host, HostConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devspec.json");

        let mut config = DevspecConfig::default();
        config.overrides.battery_info = Some("5000 mAh".to_string());
        config.host.data_dir = PathBuf::from("/");
        config.save_to_file(&path).unwrap();

        let loaded = DevspecConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = DevspecConfig::load_from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DevspecConfig::default();
        config.host.cpu_properties.clear();
        assert!(config.validate().is_err());

        let mut config = DevspecConfig::default();
        config.host.cpu_properties = vec!["ro.board platform".to_string()];
        assert!(config.validate().is_err());

        let mut config = DevspecConfig::default();
        config.host.data_dir = PathBuf::from("data");
        assert!(config.validate().is_err());

        let mut config = DevspecConfig::default();
        config.overrides.ram_info = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discover_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{"overrides": {"ram_info": "6 GB"}}"#).unwrap();
        let config = DevspecConfig::discover(Some(&path)).unwrap();
        assert_eq!(config.overrides.ram_info.as_deref(), Some("6 GB"));
    }
}
