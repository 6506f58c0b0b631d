use directories::ProjectDirs;
use md5::{Digest, Md5};
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use super::config::PrefetchConfig;
use crate::domain::{FeedItem, is_mp4, stable_key};
use crate::error::{CacheError, DownloadError};

/// 解析并创建完整下载使用的缓存目录。
pub async fn resolve_cache_dir(configured: Option<&Path>) -> Result<PathBuf, CacheError> {
    let dir = match configured {
        Some(p) => p.to_path_buf(),
        None => default_cache_dir().ok_or(CacheError::DirUnavailable)?,
    };
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| CacheError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    Ok(dir)
}

pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "reels", "reels-prefetch").map(|p| p.cache_dir().join("video_cache"))
}

/// 由稳定 key 得到确定的文件名：key 的 md5（小写 hex），MP4 源追加 `.mp4`。
pub fn cache_file_name(key: &str, url: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(key.as_bytes());
    let digest = hex::encode(hasher.finalize());
    if is_mp4(url) {
        format!("{digest}.mp4")
    } else {
        digest
    }
}

/// 将条目完整下载到缓存目录，返回本地路径。
///
/// 目标文件已存在时直接返回（幂等）。下载先写入同目录的临时文件，
/// 成功后再 rename 到目标位置，目标路径上不会出现半截文件。
pub async fn download_file(
    http: &Client,
    cfg: &PrefetchConfig,
    item: &FeedItem,
) -> Result<PathBuf, DownloadError> {
    let key = stable_key(item);
    let url = item
        .media_url()
        .ok_or_else(|| DownloadError::MissingUrl { key: key.clone() })?;

    let dir = resolve_cache_dir(cfg.cache_dir.as_deref()).await?;
    let dest = dir.join(cache_file_name(&key, url));

    if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
        tracing::debug!(key = %key, path = %dest.display(), "缓存文件已存在，跳过下载");
        return Ok(dest);
    }

    if let Some(thumb) = item.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
        spawn_thumbnail_prefetch(http.clone(), thumb.to_owned());
    }

    let tmp_path = dir.join(format!(
        "{}.{}.tmp",
        dest.file_name().and_then(|n| n.to_str()).unwrap_or("download"),
        now_ms()
    ));

    let res = download_to_path_with_config(
        http,
        &tmp_path,
        url,
        cfg.download_retries,
        cfg.download_retry_backoff_ms,
        cfg.download_retry_backoff_max_ms,
    )
    .await;
    if let Err(e) = res {
        remove_tmp(&tmp_path).await;
        return Err(e);
    }

    if let Err(source) = tokio::fs::rename(&tmp_path, &dest).await {
        remove_tmp(&tmp_path).await;
        return Err(DownloadError::Commit { path: dest, source });
    }

    tracing::info!(key = %key, path = %dest.display(), "完整下载完成");
    Ok(dest)
}

async fn remove_tmp(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::debug!(path = %path.display(), err = %e, "删除临时文件失败");
        }
    }
}

/// 缩略图预取：后台发起请求，结果忽略。
fn spawn_thumbnail_prefetch(http: Client, url: String) {
    tokio::spawn(async move {
        match http.get(&url).send().await.and_then(|r| r.error_for_status()) {
            Ok(resp) => {
                let _ = resp.bytes().await;
            }
            Err(e) => {
                tracing::debug!(url = %url, err = %e, "缩略图预取失败");
            }
        }
    });
}

pub async fn download_to_path_with_config(
    http: &Client,
    out_path: &Path,
    url: &str,
    retries: u32,
    backoff_ms: u64,
    backoff_max_ms: u64,
) -> Result<(), DownloadError> {
    let mut attempt = 0u32;
    loop {
        // Ensure each attempt starts from a clean file.
        remove_tmp(out_path).await;

        match download_once(http, out_path, url).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < retries && e.is_retryable() => {
                tracing::debug!(url = %url, attempt, err = %e, "下载失败，准备重试");
                sleep_backoff(attempt, backoff_ms, backoff_max_ms).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn download_once(http: &Client, out_path: &Path, url: &str) -> Result<(), DownloadError> {
    let resp = http.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::StatusCode {
            status,
            url: url.to_owned(),
        });
    }

    let mut file = tokio::fs::File::create(out_path)
        .await
        .map_err(|source| DownloadError::CreateFile {
            path: out_path.to_path_buf(),
            source,
        })?;

    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        file.write_all(&bytes)
            .await
            .map_err(|source| DownloadError::Write {
                path: out_path.to_path_buf(),
                source,
            })?;
    }

    file.flush().await.map_err(|source| DownloadError::Write {
        path: out_path.to_path_buf(),
        source,
    })
}

/// 删除目录下所有文件，返回 (文件数, 字节数)。
pub fn clear_dir_files(dir: &Path) -> (usize, u64) {
    let mut removed_files = 0usize;
    let mut removed_bytes = 0u64;

    let Ok(rd) = fs::read_dir(dir) else {
        return (0, 0);
    };
    for ent in rd.flatten() {
        let p = ent.path();
        if p.is_dir() {
            continue;
        }

        if let Ok(md) = ent.metadata() {
            removed_bytes = removed_bytes.saturating_add(md.len());
        }
        if fs::remove_file(&p).is_ok() {
            removed_files += 1;
        }
    }

    (removed_files, removed_bytes)
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

async fn sleep_backoff(attempt: u32, base_ms: u64, max_ms: u64) {
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.min(6)));
    let mut ms = exp.min(max_ms);

    // Tiny jitter (0..=250ms) without pulling in RNG deps.
    let jitter = now_ms() % 251;
    ms = ms.saturating_add(jitter).min(max_ms);

    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}
