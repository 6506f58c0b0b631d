//! tracing 初始化：按天滚动的日志文件，可选同时输出到 stderr。

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info,reels_prefetch=info,reqwest=warn,hyper=warn";

pub struct LogGuard(#[allow(dead_code)] Option<WorkerGuard>);

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub filter: Option<String>,
    /// 同时把日志打到 stderr（命令行调试用）
    pub stderr: bool,
}

fn writable_log_dir(preferred: PathBuf) -> PathBuf {
    if fs::create_dir_all(&preferred).is_ok() {
        return preferred;
    }
    let fallback = std::env::temp_dir().join("reels-prefetch-logs");
    let _ = fs::create_dir_all(&fallback);
    fallback
}

fn build_filter(custom: Option<String>) -> EnvFilter {
    custom
        .filter(|s| !s.trim().is_empty())
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init(data_dir: &Path, cfg: LogConfig) -> LogGuard {
    let log_dir = writable_log_dir(cfg.dir.unwrap_or_else(|| data_dir.join("logs")));

    let file_appender = tracing_appender::rolling::daily(&log_dir, "reels-prefetch.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer);

    let stderr_layer = cfg.stderr.then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(build_filter(cfg.filter))
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
    tracing::info!(log_dir = %log_dir.display(), "tracing 已初始化");

    LogGuard(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filter_falls_back() {
        // 空白过滤串不应生效
        let f = build_filter(Some("   ".to_owned()));
        assert!(!f.to_string().trim().is_empty());
    }

    #[test]
    fn test_writable_log_dir_creates_preferred() {
        let dir = tempfile::tempdir().expect("tempdir");
        let want = dir.path().join("logs");
        assert_eq!(writable_log_dir(want.clone()), want);
        assert!(want.is_dir());
    }
}
