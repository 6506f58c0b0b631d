mod cli;

use clap::Parser;
use cli::{Cli, Command};
use reels_prefetch::error::AppError;
use reels_prefetch::prefetch::{clear_dir_files, resolve_cache_dir};
use reels_prefetch::settings::{default_data_dir, load_settings, save_settings, settings_path};
use reels_prefetch::{FeedItem, PrefetchStats, VideoPrefetchManager, logging, stable_key};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct StepReport {
    index: usize,
    key: String,
    ready: bool,
    local_uri: Option<PathBuf>,
    stats: PrefetchStats,
}

fn load_feed(path: &Path) -> Result<Vec<FeedItem>, AppError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn report(mgr: &VideoPrefetchManager, index: usize, item: &FeedItem) -> StepReport {
    StepReport {
        index,
        key: stable_key(item),
        ready: mgr.is_ready(item),
        local_uri: mgr.local_uri(item),
        stats: mgr.stats(),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let _log_guard = logging::init(
        &data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
            stderr: cli.verbose,
        },
    );
    tracing::info!(data_dir = %data_dir.display(), "reels-prefetch 启动");

    let mut cfg = load_settings(&data_dir);
    if let Some(dir) = cli.cache_dir.clone() {
        cfg.cache_dir = Some(dir);
    }

    match cli.command {
        Command::Walk {
            feed,
            start,
            steps,
            keep,
        } => {
            let items = load_feed(&feed)?;
            let end = steps
                .map(|n| start.saturating_add(n))
                .unwrap_or(items.len())
                .min(items.len());
            let mgr = VideoPrefetchManager::new(cfg);

            for index in start..end {
                tokio::select! {
                    _ = mgr.prefetch(index, &items) => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!(index, "收到 Ctrl-C，停止模拟");
                        break;
                    }
                }
                // 模拟播放层：当前条目播放成功
                let item = &items[index];
                let line = report(&mgr, index, item);
                mgr.mark_as_loaded(item);
                println!("{}", serde_json::to_string(&line)?);
            }

            if keep {
                tracing::info!(stats = ?mgr.stats(), "保留已下载文件");
            } else {
                mgr.cleanup().await;
            }
            Ok(())
        }
        Command::Prefetch { feed, index } => {
            let items = load_feed(&feed)?;
            if index >= items.len() {
                return Err(AppError::Other(format!(
                    "索引越界: {index} (共 {} 条)",
                    items.len()
                )));
            }
            let mgr = VideoPrefetchManager::new(cfg);
            mgr.prefetch(index, &items).await;

            for (i, item) in items.iter().enumerate() {
                println!("{}", serde_json::to_string(&report(&mgr, i, item))?);
            }
            Ok(())
        }
        Command::Purge => {
            let dir = resolve_cache_dir(cfg.cache_dir.as_deref()).await?;
            let (files, bytes) = clear_dir_files(&dir);
            tracing::info!(dir = %dir.display(), files, bytes, "缓存目录清理完成");
            println!("已删除 {files} 个文件，共 {bytes} 字节: {}", dir.display());
            Ok(())
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            if save {
                save_settings(&data_dir, &cfg)?;
                println!("已写入 {}", settings_path(&data_dir).display());
            }
            Ok(())
        }
    }
}
