use serde::{Deserialize, Serialize};

use super::{clamp_wpm, ControllerState, Mode, Phase, SpeedController};
use crate::events::{Notifier, SpeedChangeReason};
use crate::timing::DEFAULT_WPM;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedConfig {
    pub speed: u32,
}

impl Default for FixedConfig {
    fn default() -> Self {
        Self { speed: DEFAULT_WPM }
    }
}

/// Constant speed; only the reader changes it
#[derive(Debug)]
pub struct FixedRamp {
    state: ControllerState,
    notifier: Notifier,
}

impl FixedRamp {
    pub fn new(config: FixedConfig, notifier: Notifier) -> Self {
        let speed = clamp_wpm(config.speed);
        Self {
            state: ControllerState::new(Mode::Fixed, speed, speed),
            notifier,
        }
    }
}

impl SpeedController for FixedRamp {
    fn mode(&self) -> Mode {
        Mode::Fixed
    }

    fn current_speed(&self) -> u32 {
        self.state.current_speed
    }

    fn phase(&self) -> Phase {
        Phase::Idle
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn progress(&self) -> f64 {
        100.0
    }

    fn start(&mut self) {
        self.state.is_running = true;
        self.state.is_paused = false;
    }

    fn stop(&mut self) {
        self.state.is_running = false;
    }

    fn pause(&mut self) {
        self.state.is_paused = true;
    }

    fn resume(&mut self) {
        self.state.is_paused = false;
    }

    fn reset(&mut self) {
        self.state.words_read = 0;
        self.state.is_running = false;
        self.state.is_paused = false;
    }

    fn on_word_read(&mut self, _word: &str, _is_sentence_end: bool) {
        if self.state.is_active() {
            self.state.words_read += 1;
        }
    }

    fn on_user_pause(&mut self, _duration_ms: u64) {}

    fn on_user_rewind(&mut self, _words: u32) {}

    fn set_user_speed(&mut self, wpm: u32) {
        let speed = clamp_wpm(wpm);
        if speed == self.state.current_speed {
            return;
        }
        self.state.current_speed = speed;
        self.state.start_speed = speed;
        self.state.max_speed = speed;
        self.notifier
            .speed_changed(speed, SpeedChangeReason::UserManual);
    }
}
