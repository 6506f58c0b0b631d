//! 统一错误处理模块
//!
//! 预取路径上的错误都在各自的 I/O 边界被吸收并记录日志，
//! 这里的类型用于在模块之间传递结构化信息。

mod app;
mod cache;
mod download;
mod warm;

pub use app::AppError;
pub use cache::CacheError;
pub use download::DownloadError;
pub use warm::WarmError;
