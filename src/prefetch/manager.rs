//! 短视频信息流的预取/缓存管理器

use futures_util::future::join_all;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::config::PrefetchConfig;
use super::download::download_file;
use super::state::{Action, CacheState, PrefetchStats};
use super::warm::{warm_bytes, warm_hls};
use super::window::PrefetchWindow;
use crate::domain::{FeedItem, MediaKind, is_hls, stable_key};

/// 为滚动信息流决定哪些条目完整下载、哪些预热、哪些淘汰。
///
/// 句柄可以 `clone` 后注入到多个调用方，所有克隆共享同一份状态。
/// 状态由一把互斥锁保护，锁从不跨 `await` 持有；重叠的 `prefetch`
/// 调用依靠以稳定 key 为单位的幂等集合操作去重。
#[derive(Clone)]
pub struct VideoPrefetchManager {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    config: PrefetchConfig,
    state: Mutex<CacheState>,
}

impl VideoPrefetchManager {
    pub fn new(config: PrefetchConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(Duration::from_secs(config.http_connect_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(err = %e, "初始化 HTTP 客户端失败");
                Client::new()
            });
        Self::with_client(config, http)
    }

    pub fn with_client(config: PrefetchConfig, http: Client) -> Self {
        let config = config.sanitized();
        tracing::info!(
            cache_window = config.cache_window,
            max_parallel = config.max_parallel_downloads,
            hls_segments = config.hls_segment_count,
            warm_bytes = config.warm_bytes,
            "VideoPrefetchManager 已创建"
        );
        Self {
            inner: Arc::new(Inner {
                http,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.inner.config
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 信息流停在 `current_index` 时调用：先淘汰窗口外的缓存，再按优先级预取。
    ///
    /// 列表为空或索引越界时什么也不做。不会返回错误，失败只体现为条目尚未就绪。
    pub async fn prefetch(&self, current_index: usize, items: &[FeedItem]) {
        let cfg = &self.inner.config;
        let Some(window) = PrefetchWindow::compute(current_index, items.len(), cfg.cache_window)
        else {
            return;
        };

        let keep = window.keep_keys(items);
        let (evicted, generation) = {
            let mut st = self.state();
            (st.evict_outside(&keep), st.generation)
        };
        if !evicted.is_empty() {
            tracing::debug!(current_index, count = evicted.len(), "淘汰窗口外的缓存文件");
            join_all(evicted.iter().map(|(key, path)| remove_quietly(key, path))).await;
        }

        let next_index = window.next_index();
        for index in window.priority_order() {
            let item = &items[index];
            let Some(url) = item.media_url() else {
                continue;
            };
            let key = stable_key(item);
            let kind = MediaKind::of(url);

            let action = {
                let mut st = self.state();
                if st.generation != generation {
                    // cleanup 已在中途发生，本轮剩余工作作废
                    return;
                }
                st.plan(&key, kind, Some(index) == next_index, cfg.max_parallel_downloads)
            };
            let Some(action) = action else {
                continue;
            };

            match action {
                Action::WarmHls => {
                    let ok = warm_hls(&self.inner.http, url, cfg.hls_segment_count).await;
                    self.mark_warmed(&key, ok, generation);
                }
                Action::WarmBytes => {
                    let ok = warm_bytes(&self.inner.http, url, cfg.warm_bytes).await;
                    self.mark_warmed(&key, ok, generation);
                }
                Action::Download => self.run_download(key, item.clone(), generation).await,
            }
        }
    }

    fn mark_warmed(&self, key: &str, ok: bool, generation: u64) {
        if !ok {
            return;
        }
        let mut st = self.state();
        if st.generation == generation {
            st.warmed_keys.insert(key.to_owned());
        }
    }

    /// 在独立任务里完成下载与记账，调用方的 future 被丢弃时下载名额也会归还。
    async fn run_download(&self, key: String, item: FeedItem, generation: u64) {
        let mgr = self.clone();
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            mgr.download_and_record(&task_key, &item, generation).await;
        });

        if let Err(e) = task.await {
            tracing::error!(key = %key, err = %e, "下载任务异常退出");
            let mut st = self.state();
            if st.generation == generation {
                st.finish_download(&key, None);
            }
        }
    }

    async fn download_and_record(&self, key: &str, item: &FeedItem, generation: u64) {
        tracing::debug!(key = %key, "开始完整下载");
        let res = download_file(&self.inner.http, &self.inner.config, item).await;

        let path = match res {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(key = %key, err = %e, "完整下载失败，等待下次预取重试");
                None
            }
        };

        let stale = {
            let mut st = self.state();
            if st.generation == generation {
                st.finish_download(key, path);
                None
            } else {
                path
            }
        };

        // 下载期间状态已被清空：文件不再有人记账，直接删掉
        if let Some(path) = stale {
            remove_quietly(key, &path).await;
        }
    }

    /// 已缓存、已预热或已播放过的条目可以尝试即时播放。
    pub fn is_ready(&self, item: &FeedItem) -> bool {
        let key = stable_key(item);
        let st = self.state();
        st.cached_keys.contains(&key) || st.warmed_keys.contains(&key) || st.loaded_keys.contains(&key)
    }

    /// 播放层首次成功播放时调用；除 cleanup/reset 外永不移除。
    pub fn mark_as_loaded(&self, item: &FeedItem) {
        self.state().loaded_keys.insert(stable_key(item));
    }

    /// 完整下载的本地路径。HLS 条目始终走流地址，永远返回 `None`。
    pub fn local_uri(&self, item: &FeedItem) -> Option<PathBuf> {
        if item.media_url().is_some_and(is_hls) {
            return None;
        }
        self.state().local_file_uris.get(&stable_key(item)).cloned()
    }

    pub fn is_cached(&self, item: &FeedItem) -> bool {
        self.state().cached_keys.contains(&stable_key(item))
    }

    pub fn is_warmed(&self, item: &FeedItem) -> bool {
        self.state().warmed_keys.contains(&stable_key(item))
    }

    pub fn is_downloading(&self, item: &FeedItem) -> bool {
        self.state().active_downloads.contains(&stable_key(item))
    }

    pub fn is_loaded(&self, item: &FeedItem) -> bool {
        self.state().loaded_keys.contains(&stable_key(item))
    }

    pub fn stats(&self) -> PrefetchStats {
        self.state().stats()
    }

    /// 删除所有已下载文件并清空全部状态（切换信息流、登出时调用）。
    pub async fn cleanup(&self) {
        let files = self.state().clear();
        tracing::info!(files = files.len(), "清理预取缓存");
        join_all(files.iter().map(|path| remove_quietly("", path))).await;
    }

    /// 只清空内存状态，不动磁盘文件；同一 key 再次下载时会直接复用已有文件。
    pub fn reset(&self) {
        let files = self.state().clear();
        tracing::debug!(files = files.len(), "重置预取状态");
    }
}

async fn remove_quietly(key: &str, path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(key = %key, path = %path.display(), err = %e, "删除缓存文件失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &Path) -> VideoPrefetchManager {
        VideoPrefetchManager::with_client(
            PrefetchConfig::default().with_cache_dir(dir),
            Client::new(),
        )
    }

    #[test]
    fn test_zero_parallel_config_is_clamped() {
        let cfg = PrefetchConfig {
            max_parallel_downloads: 0,
            ..PrefetchConfig::default()
        };
        let mgr = VideoPrefetchManager::with_client(cfg, Client::new());
        assert_eq!(mgr.config().max_parallel_downloads, 1);
    }

    #[tokio::test]
    async fn test_prefetch_empty_or_out_of_range_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mgr = manager(dir.path());
        mgr.prefetch(0, &[]).await;
        mgr.prefetch(3, &[FeedItem::new(1, "https://x/1.mp4")]).await;
        assert_eq!(mgr.stats(), PrefetchStats::default());
    }

    #[test]
    fn test_mark_as_loaded_makes_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mgr = manager(dir.path());
        let item = FeedItem::new(1, "https://example.com/video.mov");
        assert!(!mgr.is_ready(&item));
        mgr.mark_as_loaded(&item);
        assert!(mgr.is_ready(&item));
        assert!(mgr.is_loaded(&item));
        assert_eq!(mgr.stats().loaded, 1);
    }

    #[test]
    fn test_local_uri_never_for_hls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mgr = manager(dir.path());
        let item = FeedItem::new(9, "https://x/9/index.m3u8");
        // 即便存在残留记录也不返回
        mgr.state()
            .finish_download("9", Some(dir.path().join("stale")));
        assert!(mgr.local_uri(&item).is_none());
    }

    #[test]
    fn test_reset_keeps_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.mp4");
        std::fs::write(&file, b"x").expect("write");
        let mgr = manager(dir.path());
        mgr.state().finish_download("a", Some(file.clone()));
        mgr.reset();
        assert_eq!(mgr.stats(), PrefetchStats::default());
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mgr = manager(dir.path());
        let other = mgr.clone();
        let item = FeedItem::new(5, "https://x/5.mp4");
        other.mark_as_loaded(&item);
        assert!(mgr.is_loaded(&item));
        mgr.cleanup().await;
        assert!(!other.is_loaded(&item));
    }
}
