//! Speed ramp policies.
//!
//! Three interchangeable controllers share one contract ([`SpeedController`]):
//!
//! - [`FixedRamp`]: the reader sets the speed, nothing ramps
//! - [`TrainingRamp`]: word-count driven ramp through stabilization and
//!   acceleration, with a cooldown excursion when the reader shows strain
//! - [`DemoRamp`]: wall-clock driven ease-out ramp to the max speed
//!
//! [`RampPolicy`] is the closed set the controller facade dispatches over.

pub mod demo;
pub mod fixed;
pub mod training;

pub use demo::{DemoConfig, DemoRamp};
pub use fixed::{FixedConfig, FixedRamp};
pub use training::{TrainingConfig, TrainingRamp};

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::events::Notifier;
use crate::timing::{MAX_WPM, MIN_WPM};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Fixed,
    Training,
    Demo,
}

impl Mode {
    /// Next mode in display order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Mode::Fixed => Mode::Training,
            Mode::Training => Mode::Demo,
            Mode::Demo => Mode::Fixed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Stabilization,
    Acceleration,
    Plateau,
    Cooldown,
}

/// Snapshot of a policy's observable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub mode: Mode,
    pub current_speed: u32,
    pub start_speed: u32,
    pub max_speed: u32,
    pub phase: Phase,
    pub words_read: u32,
    pub is_running: bool,
    pub is_paused: bool,
}

impl ControllerState {
    fn new(mode: Mode, start_speed: u32, max_speed: u32) -> Self {
        Self {
            mode,
            current_speed: start_speed,
            start_speed,
            max_speed,
            phase: Phase::Idle,
            words_read: 0,
            is_running: false,
            is_paused: false,
        }
    }

    /// Words are only counted while running and not paused
    fn is_active(&self) -> bool {
        self.is_running && !self.is_paused
    }
}

/// Clamp into the global `[MIN_WPM, MAX_WPM]` range
pub fn clamp_wpm(wpm: u32) -> u32 {
    wpm.clamp(MIN_WPM, MAX_WPM)
}

/// Normalize a configured `(start, max)` pair: both inside the global range
/// and `max >= start`
pub(crate) fn normalize_range(start: u32, max: u32) -> (u32, u32) {
    let start = clamp_wpm(start);
    (start, clamp_wpm(max).max(start))
}

/// The common controller contract
pub trait SpeedController {
    fn mode(&self) -> Mode;
    fn current_speed(&self) -> u32;
    fn phase(&self) -> Phase;
    fn state(&self) -> ControllerState;
    /// Ramp progress in `[0, 100]`
    fn progress(&self) -> f64;

    fn start(&mut self);
    fn stop(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn reset(&mut self);

    fn on_word_read(&mut self, word: &str, is_sentence_end: bool);
    fn on_user_pause(&mut self, duration_ms: u64);
    fn on_user_rewind(&mut self, words: u32);
    fn set_user_speed(&mut self, wpm: u32);
}

/// Per-mode configuration accepted when a mode is selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ModeConfig {
    Fixed(FixedConfig),
    Training(TrainingConfig),
    Demo(DemoConfig),
}

impl ModeConfig {
    pub fn mode(&self) -> Mode {
        match self {
            ModeConfig::Fixed(_) => Mode::Fixed,
            ModeConfig::Training(_) => Mode::Training,
            ModeConfig::Demo(_) => Mode::Demo,
        }
    }

    /// Defaults for `mode`, seeded from the speed currently shown
    pub fn seeded(mode: Mode, speed: u32) -> Self {
        match mode {
            Mode::Fixed => ModeConfig::Fixed(FixedConfig { speed }),
            Mode::Training => ModeConfig::Training(TrainingConfig::seeded(speed)),
            Mode::Demo => ModeConfig::Demo(DemoConfig::seeded(speed)),
        }
    }
}

#[derive(Debug)]
pub enum RampPolicy<C: Clock> {
    Fixed(FixedRamp),
    Training(TrainingRamp),
    Demo(DemoRamp<C>),
}

impl<C: Clock> RampPolicy<C> {
    pub fn from_config(config: ModeConfig, clock: C, notifier: Notifier) -> Self {
        match config {
            ModeConfig::Fixed(cfg) => RampPolicy::Fixed(FixedRamp::new(cfg, notifier)),
            ModeConfig::Training(cfg) => RampPolicy::Training(TrainingRamp::new(cfg, notifier)),
            ModeConfig::Demo(cfg) => RampPolicy::Demo(DemoRamp::new(cfg, clock, notifier)),
        }
    }

    fn inner(&self) -> &dyn SpeedController {
        match self {
            RampPolicy::Fixed(p) => p,
            RampPolicy::Training(p) => p,
            RampPolicy::Demo(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SpeedController {
        match self {
            RampPolicy::Fixed(p) => p,
            RampPolicy::Training(p) => p,
            RampPolicy::Demo(p) => p,
        }
    }

    /// Scale for punctuation pauses; only Demo attenuates them
    pub fn punctuation_scale(&self) -> f64 {
        match self {
            RampPolicy::Demo(p) => p.punctuation_scale(),
            RampPolicy::Fixed(_) | RampPolicy::Training(_) => 1.0,
        }
    }
}

impl<C: Clock> SpeedController for RampPolicy<C> {
    fn mode(&self) -> Mode {
        self.inner().mode()
    }

    fn current_speed(&self) -> u32 {
        self.inner().current_speed()
    }

    fn phase(&self) -> Phase {
        self.inner().phase()
    }

    fn state(&self) -> ControllerState {
        self.inner().state()
    }

    fn progress(&self) -> f64 {
        self.inner().progress()
    }

    fn start(&mut self) {
        self.inner_mut().start()
    }

    fn stop(&mut self) {
        self.inner_mut().stop()
    }

    fn pause(&mut self) {
        self.inner_mut().pause()
    }

    fn resume(&mut self) {
        self.inner_mut().resume()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn on_word_read(&mut self, word: &str, is_sentence_end: bool) {
        self.inner_mut().on_word_read(word, is_sentence_end)
    }

    fn on_user_pause(&mut self, duration_ms: u64) {
        self.inner_mut().on_user_pause(duration_ms)
    }

    fn on_user_rewind(&mut self, words: u32) {
        self.inner_mut().on_user_rewind(words)
    }

    fn set_user_speed(&mut self, wpm: u32) {
        self.inner_mut().set_user_speed(wpm)
    }
}
