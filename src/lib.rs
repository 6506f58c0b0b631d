//! 短视频信息流的预取/缓存引擎。
//!
//! 调用方在每次滚动停止时把当前索引和条目列表交给
//! [`VideoPrefetchManager::prefetch`]，再通过查询接口判断条目是否可即时播放。

pub mod domain;
pub mod error;
pub mod logging;
pub mod prefetch;
pub mod settings;

pub use domain::{FeedItem, ItemId, MediaKind, stable_key};
pub use prefetch::{PrefetchConfig, PrefetchStats, VideoPrefetchManager};
