//! 预热（部分请求）相关错误

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum WarmError {
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP 状态码 {status}: {url}")]
    StatusCode { status: StatusCode, url: String },
}
