use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "linetype";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("linetype_config.json"))
    }

    pub fn log_path() -> PathBuf {
        let state_dir = if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        };
        state_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linetype.log")
    }
}
