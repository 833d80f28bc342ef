//! Behavioral strain detection.
//!
//! The detector never measures anything itself: the caller owns the wall clock
//! and the reading position and hands in a finished pause duration or rewind
//! distance. The detector only decides whether that measurement means the
//! reader is struggling.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrainConfig {
    pub pause_threshold_ms: u64,
    pub rewind_threshold_words: u32,
}

impl Default for StrainConfig {
    fn default() -> Self {
        Self {
            pause_threshold_ms: 3000,
            rewind_threshold_words: 20,
        }
    }
}

/// Partial update for [`StrainConfig`]; `None` keeps the current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrainConfigUpdate {
    pub pause_threshold_ms: Option<u64>,
    pub rewind_threshold_words: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrainSignal {
    Pause { duration_ms: u64 },
    Rewind { words: u32 },
}

impl fmt::Display for StrainSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrainSignal::Pause { duration_ms } => write!(f, "pause ({duration_ms}ms)"),
            StrainSignal::Rewind { words } => write!(f, "rewind ({words} words)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrainDetector {
    config: StrainConfig,
    enabled: bool,
    notifier: Notifier,
}

impl StrainDetector {
    pub fn new(config: StrainConfig, notifier: Notifier) -> Self {
        Self {
            config,
            enabled: false,
            notifier,
        }
    }

    pub fn config(&self) -> &StrainConfig {
        &self.config
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn update_config(&mut self, update: StrainConfigUpdate) {
        if let Some(ms) = update.pause_threshold_ms {
            self.config.pause_threshold_ms = ms;
        }
        if let Some(words) = update.rewind_threshold_words {
            self.config.rewind_threshold_words = words;
        }
    }

    /// True when a pause of `duration_ms` counts as strain
    pub fn on_user_pause(&mut self, duration_ms: u64) -> bool {
        if !self.enabled || duration_ms < self.config.pause_threshold_ms {
            return false;
        }
        self.notifier
            .strain_detected(StrainSignal::Pause { duration_ms });
        true
    }

    /// True when rewinding `words` words counts as strain
    pub fn on_user_rewind(&mut self, words: u32) -> bool {
        if !self.enabled || words < self.config.rewind_threshold_words {
            return false;
        }
        self.notifier.strain_detected(StrainSignal::Rewind { words });
        true
    }
}
