//! Linux host providers
//!
//! Pure Rust readers over procfs, sysfs and `statvfs(3)`. No shelling out.
//! Every path is injectable so the readers can be pointed at fixture trees.

use std::fs;
use std::path::{Path, PathBuf};

use super::{
    BATTERY_CAPACITY_KEY, BlockStats, DisplayGeometry, DisplayService, FilesystemStats,
    MemInfoSource, PowerProfile, PowerProfileSource,
};
use crate::error::{Result, SpecError};

// ============================================================================
// Filesystem
// ============================================================================

/// `statvfs(3)` on the given mount point.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsFilesystem;

impl FilesystemStats for StatvfsFilesystem {
    fn stat(&self, path: &Path) -> Result<BlockStats> {
        let stat = nix::sys::statvfs::statvfs(path)
            .map_err(|e| SpecError::unavailable("filesystem", format!("statvfs {:?}: {}", path, e)))?;

        // f_blocks is counted in fragment-size units
        Ok(BlockStats {
            block_size: stat.fragment_size() as u64,
            block_count: stat.blocks() as u64,
        })
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Reads `MemTotal` from a meminfo file.
#[derive(Debug, Clone)]
pub struct ProcMemInfo {
    path: PathBuf,
}

impl ProcMemInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcMemInfo {
    fn default() -> Self {
        Self::new("/proc/meminfo")
    }
}

impl MemInfoSource for ProcMemInfo {
    fn total_bytes(&self) -> Result<u64> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| SpecError::unavailable("meminfo", format!("{:?}: {}", self.path, e)))?;

        parse_mem_total_kb(&content)
            .map(|kb| kb.saturating_mul(1024))
            .ok_or_else(|| SpecError::unavailable("meminfo", "no MemTotal line"))
    }
}

/// `MemTotal:  16314504 kB` → 16314504
fn parse_mem_total_kb(content: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let (key, rest) = line.split_once(':')?;
        if key.trim() != "MemTotal" {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

// ============================================================================
// Display
// ============================================================================

/// First connected DRM connector's preferred mode.
///
/// DRM exposes no decoration insets, so usable height equals real height.
#[derive(Debug, Clone)]
pub struct DrmDisplay {
    dir: PathBuf,
}

impl DrmDisplay {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DisplayService for DrmDisplay {
    fn geometry(&self) -> Result<DisplayGeometry> {
        for connector in sorted_entries(&self.dir, "display")? {
            let status = read_trimmed(&connector.join("status")).unwrap_or_default();
            if status != "connected" {
                continue;
            }

            let modes = read_trimmed(&connector.join("modes")).unwrap_or_default();
            let Some((width, height)) = modes.lines().next().and_then(parse_mode) else {
                tracing::debug!("Connector {:?} is connected but has no usable mode", connector);
                continue;
            };

            tracing::debug!("Display mode {}x{} from {:?}", width, height, connector);
            return Ok(DisplayGeometry {
                width,
                usable_height: height,
                real_height: height,
            });
        }

        Err(SpecError::unavailable(
            "display",
            format!("no connected connector under {:?}", self.dir),
        ))
    }
}

/// `1920x1080` (optionally suffixed, e.g. `1920x1080i`) → (1920, 1080)
fn parse_mode(mode: &str) -> Option<(u32, u32)> {
    let (width, height) = mode.trim().split_once('x')?;
    let digits: String = height.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((width.parse().ok()?, digits.parse().ok()?))
}

// ============================================================================
// Power supply
// ============================================================================

/// Opens the first `Battery`-typed power supply.
#[derive(Debug, Clone)]
pub struct SysfsPowerSupply {
    dir: PathBuf,
}

impl SysfsPowerSupply {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PowerProfileSource for SysfsPowerSupply {
    fn open(&self) -> Result<Box<dyn PowerProfile>> {
        let battery = sorted_entries(&self.dir, "power_supply")?
            .into_iter()
            .find(|supply| read_trimmed(&supply.join("type")).as_deref() == Some("Battery"))
            .ok_or_else(|| {
                SpecError::unavailable("power_supply", format!("no battery under {:?}", self.dir))
            })?;

        Ok(Box::new(SysfsBattery { path: battery }))
    }
}

/// One battery directory; charge attributes are in µAh.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    path: PathBuf,
}

impl SysfsBattery {
    fn read_mah(&self, attribute: &str) -> Result<f64> {
        let file = self.path.join(attribute);
        let raw = read_trimmed(&file)
            .ok_or_else(|| SpecError::unavailable("power_supply", format!("{:?} unreadable", file)))?;
        let micro_amp_hours: f64 = raw
            .parse()
            .map_err(|_| SpecError::invalid(attribute, &raw))?;
        Ok(micro_amp_hours / 1000.0)
    }
}

impl PowerProfile for SysfsBattery {
    fn battery_capacity(&self) -> Result<f64> {
        self.read_mah("charge_full_design")
    }

    fn average_power(&self, key: &str) -> Result<f64> {
        match key {
            BATTERY_CAPACITY_KEY => self.read_mah("charge_full"),
            other => Err(SpecError::unavailable(
                "power_supply",
                format!("no attribute for key {:?}", other),
            )),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Directory entries sorted by name, for deterministic first-match scans.
fn sorted_entries(dir: &Path, provider: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| SpecError::unavailable(provider, format!("{:?}: {}", dir, e)))?;

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mem_total() {
        let sample = "MemTotal:       32768000 kB\nMemFree:         8192000 kB\n";
        assert_eq!(parse_mem_total_kb(sample), Some(32_768_000));
        assert_eq!(parse_mem_total_kb("MemFree: 1 kB\n"), None);
        assert_eq!(parse_mem_total_kb("MemTotal: lots kB\n"), None);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("1080x2400"), Some((1080, 2400)));
        assert_eq!(parse_mode("1920x1080i\n"), Some((1920, 1080)));
        assert_eq!(parse_mode("garbage"), None);
        assert_eq!(parse_mode("x1080"), None);
    }

    #[test]
    fn test_statvfs_root_runs() {
        // Any Linux system has a root filesystem with a block size
        let stats = StatvfsFilesystem.stat(Path::new("/")).unwrap();
        assert!(stats.block_size > 0);
    }

    #[test]
    fn test_statvfs_missing_path_is_unavailable() {
        let err = StatvfsFilesystem
            .stat(Path::new("/definitely/not/a/mount/point/12345"))
            .unwrap_err();
        assert!(matches!(err, SpecError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_unknown_power_key_fails() {
        let battery = SysfsBattery {
            path: PathBuf::from("/nonexistent"),
        };
        assert!(battery.average_power("screen.on").is_err());
        assert!(battery.battery_capacity().is_err());
    }
}
