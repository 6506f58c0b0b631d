use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// 预取/缓存配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// 完整下载文件的存放目录（None 表示使用平台缓存目录）
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// 当前条目之后保留的条目数
    #[serde(default = "default_cache_window")]
    pub cache_window: usize,
    /// 同时进行的完整下载数上限
    #[serde(default = "default_max_parallel_downloads")]
    pub max_parallel_downloads: usize,
    /// HLS 预热的分片数
    #[serde(default = "default_hls_segment_count")]
    pub hls_segment_count: usize,
    /// MP4 预热的字节数
    #[serde(default = "default_warm_bytes")]
    pub warm_bytes: u64,
    /// HTTP 超时（秒）
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// HTTP 连接超时（秒）
    #[serde(default = "default_http_connect_timeout_secs")]
    pub http_connect_timeout_secs: u64,
    /// 下载重试次数
    #[serde(default = "default_download_retries")]
    pub download_retries: u32,
    /// 重试退避初始时间（毫秒）
    #[serde(default = "default_download_retry_backoff_ms")]
    pub download_retry_backoff_ms: u64,
    /// 重试退避最大时间（毫秒）
    #[serde(default = "default_download_retry_backoff_max_ms")]
    pub download_retry_backoff_max_ms: u64,
}

fn default_cache_window() -> usize { 4 }
fn default_max_parallel_downloads() -> usize { 1 }
fn default_hls_segment_count() -> usize { 3 }
fn default_warm_bytes() -> u64 { 600_000 }
fn default_http_timeout_secs() -> u64 { 30 }
fn default_http_connect_timeout_secs() -> u64 { 10 }
fn default_download_retries() -> u32 { 2 }
fn default_download_retry_backoff_ms() -> u64 { 250 }
fn default_download_retry_backoff_max_ms() -> u64 { 2_000 }

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            cache_dir: env::var_os("REELS_PREFETCH_CACHE_DIR").map(PathBuf::from),
            cache_window: env_parse::<usize>("REELS_PREFETCH_CACHE_WINDOW").unwrap_or_else(default_cache_window),
            max_parallel_downloads: env_parse::<usize>("REELS_PREFETCH_MAX_PARALLEL")
                .filter(|v| *v > 0)
                .unwrap_or_else(default_max_parallel_downloads),
            hls_segment_count: env_parse::<usize>("REELS_PREFETCH_HLS_SEGMENTS")
                .unwrap_or_else(default_hls_segment_count),
            warm_bytes: env_parse::<u64>("REELS_PREFETCH_WARM_BYTES")
                .filter(|v| *v > 0)
                .unwrap_or_else(default_warm_bytes),
            http_timeout_secs: env_parse::<u64>("REELS_PREFETCH_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(default_http_timeout_secs),
            http_connect_timeout_secs: env_parse::<u64>("REELS_PREFETCH_HTTP_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(default_http_connect_timeout_secs),
            download_retries: env_parse::<u32>("REELS_PREFETCH_DOWNLOAD_RETRIES")
                .unwrap_or_else(default_download_retries),
            download_retry_backoff_ms: env_parse::<u64>("REELS_PREFETCH_DOWNLOAD_RETRY_BACKOFF_MS")
                .unwrap_or_else(default_download_retry_backoff_ms),
            download_retry_backoff_max_ms: env_parse::<u64>("REELS_PREFETCH_DOWNLOAD_RETRY_BACKOFF_MAX_MS")
                .unwrap_or_else(default_download_retry_backoff_max_ms),
        }
    }
}

impl PrefetchConfig {
    /// 修正无意义的取值：下载并发与预热字节数至少为 1，否则回到默认值。
    pub fn sanitized(mut self) -> Self {
        if self.max_parallel_downloads == 0 {
            tracing::warn!("max_parallel_downloads=0 会关闭完整下载，改用默认值");
            self.max_parallel_downloads = default_max_parallel_downloads();
        }
        if self.warm_bytes == 0 {
            tracing::warn!("warm_bytes=0 无效，改用默认值");
            self.warm_bytes = default_warm_bytes();
        }
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}
