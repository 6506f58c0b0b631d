//! 预热：只发起部分请求，让平台 HTTP 层提前拿到字节，不落盘。

use futures_util::StreamExt;
use futures_util::future::join_all;
use reqwest::Client;
use reqwest::header::RANGE;

use crate::domain::{has_extension, strip_query};
use crate::error::WarmError;

/// 预热 HLS：拉取清单并并发请求前 `segment_count` 个分片。
///
/// 单个分片失败会被忽略；清单本身失败时记录日志并返回 `false`。
pub async fn warm_hls(http: &Client, manifest_url: &str, segment_count: usize) -> bool {
    let manifest = match fetch_text(http, manifest_url).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(url = %manifest_url, err = %e, "HLS 清单预热失败");
            return false;
        }
    };

    let segments = segment_refs(&manifest)
        .take(segment_count)
        .map(|r| resolve_segment_url(manifest_url, r))
        .collect::<Vec<_>>();

    let results = join_all(segments.iter().map(|url| async move {
        match get_and_drain(http, url, None).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(url = %url, err = %e, "HLS 分片预热失败");
                false
            }
        }
    }))
    .await;

    tracing::debug!(
        url = %manifest_url,
        segments = segments.len(),
        ok = results.iter().filter(|ok| **ok).count(),
        "HLS 预热完成"
    );
    true
}

/// 预热 MP4：以 `Range: bytes=0-(N-1)` 请求开头的 `bytes` 个字节。
pub async fn warm_bytes(http: &Client, url: &str, bytes: u64) -> bool {
    match get_and_drain(http, url, Some(bytes)).await {
        Ok(read) => {
            tracing::debug!(url = %url, bytes = read, "MP4 区间预热完成");
            true
        }
        Err(e) => {
            tracing::warn!(url = %url, err = %e, "MP4 区间预热失败");
            false
        }
    }
}

/// 清单中的分片引用：非 `#` 指令行，且路径以 `.m4s` / `.ts` 结尾。
pub fn segment_refs(manifest: &str) -> impl Iterator<Item = &str> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| has_extension(line, ".m4s") || has_extension(line, ".ts"))
}

/// 将分片引用解析为绝对 URL。
///
/// 相对引用拼接到清单所在目录；`/` 开头的引用拼接到源站；绝对 URL 原样返回。
pub fn resolve_segment_url(manifest_url: &str, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_owned();
    }

    let base = strip_query(manifest_url);

    if let Some(rest) = reference.strip_prefix('/')
        && let Some(scheme_end) = base.find("://")
    {
        let authority_start = scheme_end + 3;
        let origin_end = base[authority_start..]
            .find('/')
            .map(|i| authority_start + i)
            .unwrap_or(base.len());
        return format!("{}/{rest}", &base[..origin_end]);
    }

    match base.rfind('/') {
        Some(i) => format!("{}{reference}", &base[..=i]),
        None => reference.to_owned(),
    }
}

async fn fetch_text(http: &Client, url: &str) -> Result<String, WarmError> {
    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(WarmError::StatusCode {
            status,
            url: url.to_owned(),
        });
    }
    Ok(resp.text().await?)
}

// 读取并丢弃响应体；`limit` 防止服务端忽略 Range 时把整个文件拉下来。
async fn get_and_drain(http: &Client, url: &str, limit: Option<u64>) -> Result<u64, WarmError> {
    let mut req = http.get(url);
    if let Some(n) = limit {
        req = req.header(RANGE, format!("bytes=0-{}", n.saturating_sub(1)));
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(WarmError::StatusCode {
            status,
            url: url.to_owned(),
        });
    }

    let mut read = 0u64;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        read = read.saturating_add(chunk?.len() as u64);
        if limit.is_some_and(|n| read >= n) {
            break;
        }
    }
    Ok(read)
}
