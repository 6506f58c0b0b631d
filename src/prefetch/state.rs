use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::domain::MediaKind;

/// 某一时刻的缓存状态计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchStats {
    pub cached: usize,
    pub warmed: usize,
    pub loaded: usize,
    pub downloading: usize,
}

/// 对单个 key 要做的预取动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Action {
    WarmHls,
    WarmBytes,
    Download,
}

/// 管理器的全部可变状态。
///
/// `cached_keys` 与 `local_file_uris` 只在下载成功和淘汰时一起修改。
#[derive(Debug, Default)]
pub(super) struct CacheState {
    pub cached_keys: HashSet<String>,
    pub warmed_keys: HashSet<String>,
    pub loaded_keys: HashSet<String>,
    pub active_downloads: HashSet<String>,
    pub local_file_uris: HashMap<String, PathBuf>,
    /// cleanup/reset 时递增，用于丢弃旧会话里仍在进行的任务结果
    pub generation: u64,
}

impl CacheState {
    /// 淘汰窗口外的完整缓存与预热记录，返回需要删除的本地文件。
    /// `loaded_keys` 记录的是播放历史，不参与淘汰。
    pub fn evict_outside(&mut self, keep: &HashSet<String>) -> Vec<(String, PathBuf)> {
        let evicted = self
            .cached_keys
            .iter()
            .filter(|k| !keep.contains(*k))
            .cloned()
            .collect::<Vec<_>>();

        let mut files = Vec::new();
        for key in evicted {
            if let Some(path) = self.local_file_uris.remove(&key) {
                files.push((key.clone(), path));
            }
            self.cached_keys.remove(&key);
        }

        self.warmed_keys.retain(|k| keep.contains(k));
        files
    }

    /// 决定对 key 做什么；需要完整下载时在此处占用下载名额。
    pub fn plan(
        &mut self,
        key: &str,
        kind: MediaKind,
        is_next: bool,
        max_parallel: usize,
    ) -> Option<Action> {
        if self.cached_keys.contains(key) || self.active_downloads.contains(key) {
            return None;
        }

        match kind {
            MediaKind::Hls if !self.warmed_keys.contains(key) => Some(Action::WarmHls),
            MediaKind::Mp4 if is_next => {
                if self.active_downloads.len() >= max_parallel {
                    return None;
                }
                self.active_downloads.insert(key.to_owned());
                Some(Action::Download)
            }
            MediaKind::Mp4 if !self.warmed_keys.contains(key) => Some(Action::WarmBytes),
            _ => None,
        }
    }

    pub fn finish_download(&mut self, key: &str, path: Option<PathBuf>) {
        self.active_downloads.remove(key);
        if let Some(path) = path {
            self.cached_keys.insert(key.to_owned());
            self.local_file_uris.insert(key.to_owned(), path);
        }
    }

    /// 清空全部状态，返回此前记录的本地文件。
    pub fn clear(&mut self) -> Vec<PathBuf> {
        self.generation = self.generation.wrapping_add(1);
        self.cached_keys.clear();
        self.warmed_keys.clear();
        self.loaded_keys.clear();
        self.active_downloads.clear();
        self.local_file_uris.drain().map(|(_, p)| p).collect()
    }

    pub fn stats(&self) -> PrefetchStats {
        PrefetchStats {
            cached: self.cached_keys.len(),
            warmed: self.warmed_keys.len(),
            loaded: self.loaded_keys.len(),
            downloading: self.active_downloads.len(),
        }
    }
}
