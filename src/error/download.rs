//! 下载相关错误

use reqwest::StatusCode;
use std::path::PathBuf;

use super::CacheError;

/// 完整下载失败的原因
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// 条目没有可下载的 URL
    #[error("条目缺少 mediaUrl: {key}")]
    MissingUrl { key: String },

    /// 缓存目录不可用
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// HTTP 请求错误
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 状态码错误
    #[error("HTTP 状态码 {status}: {url}")]
    StatusCode { status: StatusCode, url: String },

    /// 创建文件失败
    #[error("创建临时文件失败({path}): {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("写入文件失败({path}): {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 临时文件落盘失败
    #[error("提交缓存文件失败({path}): {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// 判断错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Http(_) | DownloadError::Write { .. } => true,
            DownloadError::StatusCode { status, .. } => {
                *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        let err = DownloadError::StatusCode {
            status: StatusCode::NOT_FOUND,
            url: "http://example.com/a.mp4".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 状态码 404 Not Found: http://example.com/a.mp4");
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            DownloadError::StatusCode {
                status: StatusCode::SERVICE_UNAVAILABLE,
                url: "http://example.com".to_string()
            }
            .is_retryable()
        );
        assert!(
            !DownloadError::StatusCode {
                status: StatusCode::FORBIDDEN,
                url: "http://example.com".to_string()
            }
            .is_retryable()
        );
        assert!(!DownloadError::Cache(CacheError::DirUnavailable).is_retryable());
    }
}
