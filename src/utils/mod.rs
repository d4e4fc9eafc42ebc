pub mod config;
pub mod fs;
pub mod logger;
pub mod settings_toml;

pub use config::*;
pub use fs::{list_input_files, recreate_dir};
pub use logger::{Colors, log_builder, setup_logging};
pub use settings_toml::{SettingsToml, apply_file_to_opts, load_settings_toml};
