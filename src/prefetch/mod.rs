mod config;
mod download;
mod manager;
mod state;
mod warm;
mod window;

pub use config::PrefetchConfig;
pub use download::{cache_file_name, clear_dir_files, default_cache_dir, download_file, resolve_cache_dir};
pub use manager::VideoPrefetchManager;
pub use state::PrefetchStats;
pub use warm::{resolve_segment_url, segment_refs, warm_bytes, warm_hls};
pub use window::PrefetchWindow;
