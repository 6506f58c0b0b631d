use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::prefetch::PrefetchConfig;

/// 读取 `{data_dir}/prefetch.json`；文件缺失或损坏时使用默认配置。
pub fn load_settings(data_dir: &Path) -> PrefetchConfig {
    let p = settings_path(data_dir);
    let Ok(bytes) = fs::read(&p) else {
        return PrefetchConfig::default();
    };
    match serde_json::from_slice::<PrefetchConfig>(&bytes) {
        Ok(cfg) => cfg.sanitized(),
        Err(e) => {
            tracing::warn!(path = %p.display(), err = %e, "预取配置解析失败，使用默认值");
            PrefetchConfig::default()
        }
    }
}

pub fn save_settings(data_dir: &Path, s: &PrefetchConfig) -> std::io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let p = settings_path(data_dir);
    let tmp = p.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(s).unwrap_or_else(|_| b"{}".to_vec());
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, &p) {
        let _ = fs::remove_file(&p);
        fs::rename(&tmp, &p).map_err(|_| e)?;
    }
    Ok(())
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("prefetch.json")
}

/// 默认数据目录（系统 data_local_dir，失败时退回临时目录）。
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("dev", "reels", "reels-prefetch")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("reels-prefetch"))
}
