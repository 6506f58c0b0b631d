//! 缓存目录相关错误

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// 无法解析平台缓存目录
    #[error("缓存目录不可用")]
    DirUnavailable,

    /// 创建缓存目录失败
    #[error("创建缓存目录失败({path}): {source}")]
    CreateDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
