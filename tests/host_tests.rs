//! Linux host providers against fixture trees
//!
//! Each test builds a miniature procfs/sysfs layout in a temp dir and points
//! the providers at it, then drives the full resolver on top.

use std::fs;
use std::path::{Path, PathBuf};

use devspec::hardware::linux::{DrmDisplay, ProcMemInfo, StatvfsFilesystem, SysfsPowerSupply};
use devspec::hardware::props::MapPropertyStore;
use devspec::{
    CapabilityResolver, DevspecConfig, DisplayService, FilesystemStats, HostProviders,
    MemInfoSource, PowerProfile, PowerProfileSource, SpecError,
};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A fake host root with meminfo, a DRM connector, a battery and build.prop
fn fake_host() -> (TempDir, DevspecConfig) {
    let root = TempDir::new().unwrap();
    let base = root.path();

    write(
        &base.join("proc/meminfo"),
        "MemTotal:        7864320 kB\nMemFree:         1024000 kB\nMemAvailable:    4096000 kB\n",
    );

    // Disconnected connector sorts first and must be skipped
    write(&base.join("drm/card0-DP-1/status"), "disconnected\n");
    write(&base.join("drm/card0-DP-1/modes"), "");
    write(&base.join("drm/card0-eDP-1/status"), "connected\n");
    write(&base.join("drm/card0-eDP-1/modes"), "1080x2400\n720x1600\n");

    write(&base.join("power_supply/AC/type"), "Mains\n");
    write(&base.join("power_supply/BAT0/type"), "Battery\n");
    write(&base.join("power_supply/BAT0/charge_full_design"), "4500000\n");
    write(&base.join("power_supply/BAT0/charge_full"), "4321500\n");

    write(
        &base.join("system/build.prop"),
        "# build properties\nro.board.platform=kalama\nro.product.system.model=Everest One\n",
    );

    let mut config = DevspecConfig::default();
    config.host.meminfo_path = base.join("proc/meminfo");
    config.host.drm_dir = base.join("drm");
    config.host.power_supply_dir = base.join("power_supply");
    config.host.property_files = vec![base.join("system/build.prop")];
    config.host.data_dir = PathBuf::from("/");

    (root, config)
}

#[test]
fn proc_meminfo_reads_total_bytes() {
    let (_root, config) = fake_host();
    let mem = ProcMemInfo::new(&config.host.meminfo_path);
    assert_eq!(mem.total_bytes().unwrap(), 7_864_320 * 1024);
}

#[test]
fn proc_meminfo_missing_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mem = ProcMemInfo::new(dir.path().join("meminfo"));
    assert!(matches!(
        mem.total_bytes(),
        Err(SpecError::SourceUnavailable { .. })
    ));
}

#[test]
fn drm_display_uses_first_connected_mode() {
    let (_root, config) = fake_host();
    let geometry = DrmDisplay::new(&config.host.drm_dir).geometry().unwrap();
    assert_eq!(geometry.width, 1080);
    assert_eq!(geometry.usable_height, 2400);
    assert_eq!(geometry.real_height, 2400);
}

#[test]
fn drm_display_without_connection_is_unavailable() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("card0-HDMI-A-1/status"), "disconnected\n");
    let err = DrmDisplay::new(dir.path()).geometry().unwrap_err();
    assert!(matches!(err, SpecError::SourceUnavailable { .. }));

    let err = DrmDisplay::new(dir.path().join("absent")).geometry().unwrap_err();
    assert!(matches!(err, SpecError::SourceUnavailable { .. }));
}

#[test]
fn sysfs_battery_accessors() {
    let (_root, config) = fake_host();
    let profile = SysfsPowerSupply::new(&config.host.power_supply_dir)
        .open()
        .unwrap();
    assert_eq!(profile.battery_capacity().unwrap(), 4500.0);
    assert_eq!(profile.average_power("battery.capacity").unwrap(), 4321.5);
    assert!(profile.average_power("cpu.idle").is_err());
}

#[test]
fn sysfs_without_battery_cannot_open() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("AC/type"), "Mains\n");
    assert!(SysfsPowerSupply::new(dir.path()).open().is_err());
}

#[test]
fn statvfs_reports_root_filesystem() {
    let stats = StatvfsFilesystem.stat(Path::new("/")).unwrap();
    assert!(stats.block_size > 0);
    assert!(stats.block_count > 0);
}

#[test]
fn resolver_over_fake_host() {
    let (_root, config) = fake_host();
    let overlay = MapPropertyStore::new().with("ro.everest.cpu", "Snapdragon 8 Gen 2");
    let host = HostProviders::linux(&config.host, overlay);
    let resolver = CapabilityResolver::from_config(&config, host);

    assert_eq!(resolver.processor_model(), "Snapdragon 8 Gen 2");
    assert_eq!(resolver.device_name(), "Everest One");
    assert_eq!(resolver.screen_resolution().unwrap(), "1080 x 2400");
    assert_eq!(resolver.battery_capacity(), "4500 mAh");
    // 7864320 kB = 7680 MiB = 7.5 GB, rounded up
    assert_eq!(resolver.ram_size().unwrap(), "8 GB");

    let storage = resolver.storage_size().unwrap();
    assert!(storage.ends_with(" GB"), "{}", storage);
    assert_eq!(
        resolver.storage_and_ram_summary().unwrap(),
        format!("{} ROM | 8 GB RAM", storage)
    );
}

#[test]
fn resolver_falls_back_to_board_platform_and_keyed_capacity() {
    let (root, config) = fake_host();
    fs::remove_file(root.path().join("power_supply/BAT0/charge_full_design")).unwrap();

    let host = HostProviders::linux(&config.host, MapPropertyStore::new());
    let resolver = CapabilityResolver::from_config(&config, host);

    assert_eq!(resolver.processor_model(), "kalama");
    assert_eq!(resolver.battery_capacity(), "4321 mAh");
}

#[test]
fn resolver_on_empty_host_degrades() {
    let root = TempDir::new().unwrap();
    let mut config = DevspecConfig::default();
    config.host.meminfo_path = root.path().join("meminfo");
    config.host.drm_dir = root.path().join("drm");
    config.host.power_supply_dir = root.path().join("power_supply");
    config.host.property_files = vec![root.path().join("build.prop")];
    config.host.data_dir = root.path().join("not-mounted");

    let host = HostProviders::linux(&config.host, MapPropertyStore::new());
    let resolver = CapabilityResolver::from_config(&config, host);

    assert_eq!(resolver.processor_model(), "unknown");
    assert_eq!(resolver.battery_capacity(), "3000 mAh");
    assert!(resolver.screen_resolution().is_err());
    assert!(resolver.storage_size().is_err());
    assert!(resolver.ram_size().is_err());

    let report = resolver.report();
    assert_eq!(report.iter().filter(|r| r.error.is_some()).count(), 4);
}
