//! Host data providers
//!
//! The resolver never touches the host directly. Every live query goes
//! through one of the traits below, so the resolver can be driven by the
//! Linux implementations in [`linux`] and [`props`] or by test stubs.
//!
//! # Contracts
//!
//! - **PropertyStore**: empty string means "not set", never an error
//! - **PowerProfileSource / PowerProfile**: both construction and accessors
//!   may fail; the battery chain swallows those failures
//! - **FilesystemStats / MemInfoSource / DisplayService**: failures surface as
//!   [`SpecError::SourceUnavailable`](crate::error::SpecError)
//!
//! All traits are `Send + Sync` so one resolver can serve many threads.

pub mod linux;
pub mod props;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config_file::HostConfig;
use crate::error::Result;

/// Key/value host property lookup (build.prop, system properties).
pub trait PropertyStore: Send + Sync {
    /// Value of `name`, or an empty string if it is not set.
    fn get(&self, name: &str) -> String;
}

/// Keyed power-profile entry holding the battery capacity in mAh
pub const BATTERY_CAPACITY_KEY: &str = "battery.capacity";

/// An opened power profile with two independent capacity accessors.
pub trait PowerProfile {
    /// Design capacity in mAh.
    fn battery_capacity(&self) -> Result<f64>;

    /// Keyed lookup, e.g. `"battery.capacity"`.
    fn average_power(&self, key: &str) -> Result<f64>;
}

/// Constructs power profiles. Construction itself may fail.
pub trait PowerProfileSource: Send + Sync {
    fn open(&self) -> Result<Box<dyn PowerProfile>>;
}

/// Raw filesystem block statistics for one mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStats {
    /// Size of one block in bytes
    pub block_size: u64,
    /// Total number of blocks
    pub block_count: u64,
}

pub trait FilesystemStats: Send + Sync {
    fn stat(&self, path: &Path) -> Result<BlockStats>;
}

pub trait MemInfoSource: Send + Sync {
    /// Total physical memory in bytes.
    fn total_bytes(&self) -> Result<u64>;
}

/// Display size in pixels.
///
/// `usable_height` excludes system decorations (navigation bar),
/// `real_height` is the full panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    pub width: u32,
    pub usable_height: u32,
    pub real_height: u32,
}

impl fmt::Display for DisplayGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} (real height {})",
            self.width, self.usable_height, self.real_height
        )
    }
}

pub trait DisplayService: Send + Sync {
    fn geometry(&self) -> Result<DisplayGeometry>;
}

/// The full set of host providers a resolver reads from.
#[derive(Clone)]
pub struct HostProviders {
    pub properties: Arc<dyn PropertyStore>,
    pub power: Arc<dyn PowerProfileSource>,
    pub filesystem: Arc<dyn FilesystemStats>,
    pub memory: Arc<dyn MemInfoSource>,
    pub display: Arc<dyn DisplayService>,
}

impl HostProviders {
    /// Linux providers reading the locations named in `config`.
    ///
    /// `overlay` properties take priority over the property files.
    pub fn linux(config: &HostConfig, overlay: props::MapPropertyStore) -> Self {
        Self {
            properties: Arc::new(props::BuildPropStore::new(
                config.property_files.clone(),
                overlay,
            )),
            power: Arc::new(linux::SysfsPowerSupply::new(&config.power_supply_dir)),
            filesystem: Arc::new(linux::StatvfsFilesystem),
            memory: Arc::new(linux::ProcMemInfo::new(&config.meminfo_path)),
            display: Arc::new(linux::DrmDisplay::new(&config.drm_dir)),
        }
    }
}

impl fmt::Debug for HostProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostProviders").finish_non_exhaustive()
    }
}
