use reels_prefetch::prefetch::PrefetchConfig;
use reels_prefetch::settings::{load_settings, save_settings, settings_path};
use std::fs;

#[test]
fn settings_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();

    let s = PrefetchConfig {
        cache_window: 6,
        warm_bytes: 1_000_000,
        download_retries: 0,
        ..PrefetchConfig::default()
    }
    .with_cache_dir(data_dir.join("videos"));
    save_settings(data_dir, &s).expect("save_settings");

    let loaded = load_settings(data_dir);
    assert_eq!(loaded, s);
}

#[test]
fn settings_corrupt_file_falls_back_to_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();
    fs::write(settings_path(data_dir), b"{not-json").expect("write");

    let loaded = load_settings(data_dir);
    assert_eq!(loaded.max_parallel_downloads, PrefetchConfig::default().max_parallel_downloads);
}

#[test]
fn settings_zero_bounds_are_clamped_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();
    fs::write(
        settings_path(data_dir),
        br#"{"max_parallel_downloads": 0, "warm_bytes": 0}"#,
    )
    .expect("write");

    let loaded = load_settings(data_dir);
    assert_eq!(loaded.max_parallel_downloads, 1);
    assert_eq!(loaded.warm_bytes, 600_000);
}
