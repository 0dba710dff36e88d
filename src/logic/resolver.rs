//! Capability Resolver
//!
//! Answers one query per capability kind by walking that kind's sources in
//! priority order and normalizing the first usable value.
//!
//! # Resolution Rules
//!
//! | Capability      | Source order |
//! |-----------------|--------------|
//! | Processor model | override → CPU properties (in order) → `"unknown"` |
//! | Device name     | model properties (in order) → `"unknown"` |
//! | Screen          | override → display geometry (inset corrected) |
//! | Battery         | override → power profile capacity → keyed `battery.capacity` → 3000 mAh |
//! | Storage         | override → statvfs of the data dir → bucket |
//! | RAM             | override → meminfo total → whole GB, rounded up |
//! | Summary         | both overrides → live storage + live RAM |
//!
//! # Design
//!
//! - **Stateless**: Every query reads its sources afresh; nothing is cached
//! - **Injected host**: All live reads go through [`HostProviders`]
//! - **Shared normalization**: The summary reuses the storage and RAM
//!   measurement paths, so its numbers match the individual queries
//! - **Battery never fails**: Provider errors degrade to the next source

use serde::Serialize;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use super::chain::SourceChain;
use crate::config_file::{DevspecConfig, HostConfig, OverrideTable};
use crate::engine::normalize;
use crate::error::Result;
use crate::hardware::{BATTERY_CAPACITY_KEY, HostProviders, PowerProfile};
use crate::types::CapabilityKind;

/// Returned when no property in a chain is set
pub const UNKNOWN: &str = "unknown";

/// Outcome of resolving one capability, for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub kind: CapabilityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolves device capabilities from an override table and host providers.
#[derive(Debug, Clone)]
pub struct CapabilityResolver {
    overrides: OverrideTable,
    host: HostProviders,
    data_dir: PathBuf,
    cpu_properties: Vec<String>,
    model_properties: Vec<String>,
}

impl CapabilityResolver {
    /// Resolver with default property names and data directory.
    pub fn new(overrides: OverrideTable, host: HostProviders) -> Self {
        let defaults = HostConfig::default();
        Self {
            overrides,
            host,
            data_dir: defaults.data_dir,
            cpu_properties: defaults.cpu_properties,
            model_properties: defaults.model_properties,
        }
    }

    /// Resolver taking overrides, property names and data dir from `config`.
    pub fn from_config(config: &DevspecConfig, host: HostProviders) -> Self {
        Self {
            overrides: config.overrides.clone(),
            host,
            data_dir: config.host.data_dir.clone(),
            cpu_properties: config.host.cpu_properties.clone(),
            model_properties: config.host.model_properties.clone(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Processor model; never fails, `"unknown"` when nothing is set.
    pub fn processor_model(&self) -> String {
        if let Some(value) = self.override_for(CapabilityKind::ProcessorModel) {
            return value;
        }
        self.property_chain("processor", &self.cpu_properties)
    }

    /// Marketing model name; never fails, `"unknown"` when nothing is set.
    pub fn device_name(&self) -> String {
        self.property_chain("device", &self.model_properties)
    }

    /// `"<width> x <height>"` with navigation-bar insets added back.
    pub fn screen_resolution(&self) -> Result<String> {
        if let Some(value) = self.override_for(CapabilityKind::ScreenResolution) {
            return Ok(value);
        }
        let geometry = self.host.display.geometry()?;
        debug!("screen: display geometry {}", geometry);
        normalize::screen_resolution(geometry)
    }

    /// `"<n> mAh"`; never fails, falls back to the default capacity.
    pub fn battery_capacity(&self) -> String {
        if let Some(value) = self.override_for(CapabilityKind::BatteryCapacity) {
            return value;
        }
        normalize::format_mah(self.measure_battery_mah())
    }

    /// Storage bucket label, e.g. `"128 GB"` or `"512+ GB"`.
    pub fn storage_size(&self) -> Result<String> {
        if let Some(value) = self.override_for(CapabilityKind::StorageSize) {
            return Ok(value);
        }
        self.measure_storage()
    }

    /// Whole-GB RAM size, e.g. `"8 GB"`.
    pub fn ram_size(&self) -> Result<String> {
        if let Some(value) = self.override_for(CapabilityKind::RamSize) {
            return Ok(value);
        }
        self.measure_ram()
    }

    /// `"<storage> | <ram>"` from overrides when both are set, otherwise
    /// `"<storage> ROM | <ram> RAM"` from live sources.
    pub fn storage_and_ram_summary(&self) -> Result<String> {
        let storage_override = self.overrides.get(CapabilityKind::StorageSize);
        let ram_override = self.overrides.get(CapabilityKind::RamSize);

        if let (Some(storage), Some(ram)) = (storage_override, ram_override) {
            debug!("summary: using storage and RAM overrides");
            return Ok(format!("{} | {}", storage, ram));
        }
        if storage_override.is_some() || ram_override.is_some() {
            debug!("summary: only one override set, measuring both live");
        }

        let storage = self.measure_storage()?;
        let ram = self.measure_ram()?;
        Ok(format!("{} ROM | {} RAM", storage, ram))
    }

    /// `"Internal Storage: <size>"`; an override is returned unlabelled.
    pub fn storage_info(&self) -> Result<String> {
        if let Some(value) = self.override_for(CapabilityKind::StorageSize) {
            return Ok(value);
        }
        Ok(format!("Internal Storage: {}", self.measure_storage()?))
    }

    /// `"RAM: <size>"`; an override is returned unlabelled.
    pub fn ram_info(&self) -> Result<String> {
        if let Some(value) = self.override_for(CapabilityKind::RamSize) {
            return Ok(value);
        }
        Ok(format!("RAM: {}", self.measure_ram()?))
    }

    /// Resolve any capability by kind.
    pub fn resolve(&self, kind: CapabilityKind) -> Result<String> {
        match kind {
            CapabilityKind::ProcessorModel => Ok(self.processor_model()),
            CapabilityKind::ScreenResolution => self.screen_resolution(),
            CapabilityKind::BatteryCapacity => Ok(self.battery_capacity()),
            CapabilityKind::StorageSize => self.storage_size(),
            CapabilityKind::RamSize => self.ram_size(),
            CapabilityKind::StorageAndRamSummary => self.storage_and_ram_summary(),
            CapabilityKind::DeviceName => Ok(self.device_name()),
        }
    }

    /// Resolve every kind; a failing kind is reported, not propagated.
    pub fn report(&self) -> Vec<CapabilityReport> {
        CapabilityKind::iter()
            .map(|kind| match self.resolve(kind) {
                Ok(value) => CapabilityReport {
                    kind,
                    value: Some(value),
                    error: None,
                },
                Err(e) => {
                    warn!("{} could not be resolved: {}", kind, e);
                    CapabilityReport {
                        kind,
                        value: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    // ========================================================================
    // Sources
    // ========================================================================

    fn override_for(&self, kind: CapabilityKind) -> Option<String> {
        let value = self.overrides.get(kind)?;
        debug!("{}: using configured override", kind);
        Some(value.to_string())
    }

    fn property_chain(&self, capability: &'static str, names: &[String]) -> String {
        names
            .iter()
            .fold(SourceChain::<String>::new(capability), |chain, name| {
                chain.attempt(format!("property {}", name), move || {
                    Some(self.host.properties.get(name))
                })
            })
            .first_non_empty()
            .map(|hit| hit.value)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Live storage bucket for the data directory, ignoring overrides.
    fn measure_storage(&self) -> Result<String> {
        let stats = self.host.filesystem.stat(&self.data_dir)?;
        debug!(
            "storage: {} blocks of {} bytes at {:?}",
            stats.block_count, stats.block_size, self.data_dir
        );
        normalize::storage_size(stats)
    }

    /// Live RAM size, ignoring overrides.
    fn measure_ram(&self) -> Result<String> {
        let total = self.host.memory.total_bytes()?;
        debug!("ram: {} bytes total", total);
        normalize::ram_size(total)
    }

    fn measure_battery_mah(&self) -> u64 {
        let profile = match self.host.power.open() {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("battery: power profile unavailable: {}", e);
                None
            }
        };

        let hit = profile.as_deref().and_then(|profile: &dyn PowerProfile| {
            SourceChain::new("battery")
                .attempt("power_profile.battery_capacity", || {
                    accept_capacity("battery_capacity", profile.battery_capacity())
                })
                .attempt(format!("power_profile.average_power({})", BATTERY_CAPACITY_KEY), || {
                    accept_capacity(
                        "average_power",
                        profile.average_power(BATTERY_CAPACITY_KEY),
                    )
                })
                .evaluate()
        });

        match hit {
            Some(hit) => normalize::battery_mah(hit.value),
            None => {
                debug!(
                    "battery: no capacity from power profile, using {} mAh",
                    normalize::DEFAULT_BATTERY_CAPACITY_MAH
                );
                normalize::DEFAULT_BATTERY_CAPACITY_MAH
            }
        }
    }
}

/// Positive capacity from an accessor result; errors are logged and dropped.
fn accept_capacity(accessor: &str, result: Result<f64>) -> Option<f64> {
    match result {
        Ok(capacity) => {
            let accepted = normalize::positive_capacity(capacity);
            if accepted.is_none() {
                debug!("battery: {} returned non-positive {}", accessor, capacity);
            }
            accepted
        }
        Err(e) => {
            warn!("battery: {} failed: {}", accessor, e);
            None
        }
    }
}
