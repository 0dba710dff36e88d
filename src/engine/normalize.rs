//! Measurement normalizer
//!
//! Turns raw host measurements into presentable values: storage buckets,
//! whole-GB RAM, truncated battery capacity and inset-corrected screen size.
//!
//! # Design
//!
//! - **Pure logic**: No I/O, no logging, no side effects
//! - **Single path**: The per-kind resolvers and the combined storage+RAM
//!   summary both call these functions, so their numbers always agree
//! - **Strict domain**: Non-positive measurements are errors, never bucketed

use crate::error::{Result, SpecError};
use crate::hardware::{BlockStats, DisplayGeometry};
use crate::types::StorageBucket;

pub const BYTES_PER_GIB: u64 = 1 << 30;
pub const BYTES_PER_MIB: u64 = 1 << 20;
pub const MIB_PER_GB: u64 = 1024;

/// Reported when no power profile yields a positive capacity
pub const DEFAULT_BATTERY_CAPACITY_MAH: u64 = 3000;

// ============================================================================
// Storage
// ============================================================================

/// Total capacity in GiB: `blocks × block_size / 2^30`.
pub fn storage_gib(stats: BlockStats) -> f64 {
    let bytes = u128::from(stats.block_count) * u128::from(stats.block_size);
    bytes as f64 / BYTES_PER_GIB as f64
}

/// Smallest bucket whose threshold is ≥ `gib`, or `Over512` past the last one.
///
/// `gib` must be positive; zero, negative and NaN are `InvalidMeasurement`.
pub fn storage_bucket(gib: f64) -> Result<StorageBucket> {
    if gib.is_nan() || gib <= 0.0 {
        return Err(SpecError::invalid("storage GiB", gib));
    }

    let bucket = StorageBucket::BOUNDED
        .into_iter()
        .find(|bucket| {
            bucket
                .threshold_gib()
                .is_some_and(|threshold| gib <= f64::from(threshold))
        })
        .unwrap_or(StorageBucket::Over512);

    Ok(bucket)
}

/// Bucket label (`"128 GB"`, `"512+ GB"`) for raw block statistics.
pub fn storage_size(stats: BlockStats) -> Result<String> {
    storage_bucket(storage_gib(stats)).map(|bucket| bucket.to_string())
}

// ============================================================================
// RAM
// ============================================================================

/// Whole GB of RAM: bytes → MiB (floor), then MiB / 1024 rounded up.
///
/// 3200 MiB → 4, 1024 MiB → 1, 1 MiB → 1. Less than one MiB is invalid.
pub fn ram_gb(total_bytes: u64) -> Result<u64> {
    let mib = total_bytes / BYTES_PER_MIB;
    if mib == 0 {
        return Err(SpecError::invalid("total memory bytes", total_bytes));
    }
    Ok(mib.div_ceil(MIB_PER_GB))
}

/// `"<n> GB"` for a total memory size in bytes.
pub fn ram_size(total_bytes: u64) -> Result<String> {
    ram_gb(total_bytes).map(|gb| format!("{} GB", gb))
}

// ============================================================================
// Battery
// ============================================================================

/// Accepts only finite, strictly positive capacities.
pub fn positive_capacity(capacity: f64) -> Option<f64> {
    (capacity.is_finite() && capacity > 0.0).then_some(capacity)
}

/// Capacity with the fractional part discarded (3700.9 → 3700).
pub fn battery_mah(capacity: f64) -> u64 {
    capacity.trunc() as u64
}

pub fn format_mah(mah: u64) -> String {
    format!("{} mAh", mah)
}

// ============================================================================
// Screen
// ============================================================================

/// Height hidden by system decorations; never negative.
pub fn inset_correction(usable_height: u32, real_height: u32) -> u32 {
    real_height.saturating_sub(usable_height)
}

/// `"<width> x <height>"` with the inset correction added back to the height.
pub fn screen_resolution(geometry: DisplayGeometry) -> Result<String> {
    if geometry.width == 0 || geometry.usable_height == 0 {
        return Err(SpecError::invalid("display geometry", geometry));
    }
    let height = geometry.usable_height
        + inset_correction(geometry.usable_height, geometry.real_height);
    Ok(format!("{} x {}", geometry.width, height))
}
