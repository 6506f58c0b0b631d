//! 命令行程序错误

use super::CacheError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("JSON 序列化失败: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("缓存错误: {0}")]
    Cache(#[from] CacheError),

    /// 其他错误
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_converts() {
        let err: AppError = CacheError::DirUnavailable.into();
        assert!(err.to_string().contains("缓存目录不可用"));
    }
}
