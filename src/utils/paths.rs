use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "PAYCYCLE_HOME";
const DEFAULT_DIR_NAME: &str = ".paycycle";
const DATA_DIR: &str = "data";

/// Application home: `$PAYCYCLE_HOME`, else `~/.paycycle`, else `./.paycycle`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = std::env::var_os(HOME_ENV) {
        if !custom.is_empty() {
            return PathBuf::from(custom);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME))
}

pub fn data_dir_in(base: &Path) -> PathBuf {
    base.join(DATA_DIR)
}
