pub mod store;

pub use store::{default_data_dir, load_settings, save_settings, settings_path};
