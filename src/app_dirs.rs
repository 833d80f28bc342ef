use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "rampread")
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file location. The terminal is in raw mode while reading, so
    /// tracing output always goes here.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("rampread");
            Some(state_dir.join("rampread.log"))
        } else {
            Self::project().map(|pd| pd.data_local_dir().join("rampread.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_namespaced() {
        if let Some(path) = AppDirs::log_path() {
            assert!(path.ends_with("rampread/rampread.log"));
        }
        if let Some(path) = AppDirs::config_path() {
            assert!(path.ends_with("config.json"));
            assert!(path.to_string_lossy().contains("rampread"));
        }
    }
}
