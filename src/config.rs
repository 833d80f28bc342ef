use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::ramp::{DemoConfig, FixedConfig, Mode, ModeConfig, TrainingConfig};
use crate::timing::TimingConfig;

/// Everything persisted between runs. Each mode keeps its own config so
/// switching back and forth doesn't lose tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub timing: TimingConfig,
    pub fixed: FixedConfig,
    pub training: TrainingConfig,
    pub demo: DemoConfig,
}

impl Settings {
    /// Config of the selected mode
    pub fn mode_config(&self) -> ModeConfig {
        self.config_for(self.mode)
    }

    pub fn config_for(&self, mode: Mode) -> ModeConfig {
        match mode {
            Mode::Fixed => ModeConfig::Fixed(self.fixed),
            Mode::Training => ModeConfig::Training(self.training),
            Mode::Demo => ModeConfig::Demo(self.demo),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("rampread_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Settings::default(),
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable settings, using defaults");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
