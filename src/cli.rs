use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "reels-prefetch",
    version,
    about = "短视频信息流预取/缓存引擎的命令行驱动"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 覆盖数据目录（默认走系统 data_local_dir）
    #[arg(long, env = "REELS_PREFETCH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// 覆盖视频缓存目录（默认走系统 cache_dir）
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// 覆盖日志目录（默认 `{data_dir}/logs`）
    #[arg(long, env = "REELS_PREFETCH_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// 覆盖日志过滤（等价于设置 RUST_LOG）
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    /// 日志同时输出到 stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 模拟逐条下滑：对每个索引调用一次 prefetch 并打印状态
    Walk {
        /// 信息流 JSON（FeedItem 数组）
        #[arg(long)]
        feed: PathBuf,

        #[arg(long, default_value_t = 0)]
        start: usize,

        /// 最多走多少步（默认走到末尾）
        #[arg(long)]
        steps: Option<usize>,

        /// 结束后保留已下载文件
        #[arg(long)]
        keep: bool,
    },

    /// 在指定索引调用一次 prefetch
    Prefetch {
        #[arg(long)]
        feed: PathBuf,

        #[arg(long)]
        index: usize,
    },

    /// 删除缓存目录中的所有文件
    Purge,

    /// 打印当前生效的配置
    Config {
        /// 写入 `{data_dir}/prefetch.json`
        #[arg(long)]
        save: bool,
    },
}
