//! Type-safe capability types for devspec
//!
//! Capability kinds and storage buckets are proper Rust enums so the CLI,
//! the override table and the resolver all agree on the same names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One queryable device capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    #[strum(serialize = "processor")]
    ProcessorModel,
    #[strum(serialize = "screen")]
    ScreenResolution,
    #[strum(serialize = "battery")]
    BatteryCapacity,
    #[strum(serialize = "storage")]
    StorageSize,
    #[strum(serialize = "ram")]
    RamSize,
    #[strum(serialize = "summary")]
    StorageAndRamSummary,
    #[strum(serialize = "device")]
    DeviceName,
}

impl CapabilityKind {
    /// Human-readable label used in text output
    pub fn label(self) -> &'static str {
        match self {
            Self::ProcessorModel => "Processor",
            Self::ScreenResolution => "Screen",
            Self::BatteryCapacity => "Battery",
            Self::StorageSize => "Storage",
            Self::RamSize => "RAM",
            Self::StorageAndRamSummary => "Storage | RAM",
            Self::DeviceName => "Device",
        }
    }

    /// Returns true if the kind has its own entry in the override table.
    pub fn has_override(self) -> bool {
        !matches!(self, Self::StorageAndRamSummary | Self::DeviceName)
    }
}

/// Marketing-size storage bucket, in GB
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, EnumIter)]
pub enum StorageBucket {
    #[strum(serialize = "16 GB")]
    Gb16,
    #[strum(serialize = "32 GB")]
    Gb32,
    #[strum(serialize = "64 GB")]
    Gb64,
    #[strum(serialize = "128 GB")]
    Gb128,
    #[strum(serialize = "256 GB")]
    Gb256,
    #[strum(serialize = "512 GB")]
    Gb512,
    /// Open-ended top bucket
    #[strum(serialize = "512+ GB")]
    Over512,
}

impl StorageBucket {
    /// Closed buckets in ascending order; `Over512` is reached past the last one.
    pub const BOUNDED: [StorageBucket; 6] = [
        Self::Gb16,
        Self::Gb32,
        Self::Gb64,
        Self::Gb128,
        Self::Gb256,
        Self::Gb512,
    ];

    /// Upper threshold in GiB, `None` for the open top bucket.
    pub fn threshold_gib(self) -> Option<u32> {
        match self {
            Self::Gb16 => Some(16),
            Self::Gb32 => Some(32),
            Self::Gb64 => Some(64),
            Self::Gb128 => Some(128),
            Self::Gb256 => Some(256),
            Self::Gb512 => Some(512),
            Self::Over512 => None,
        }
    }
}
