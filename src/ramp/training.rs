//! Adaptive training ramp.
//!
//! ```text
//! Idle ──start──▶ Stabilization ──N words──▶ Acceleration ──max / budget──▶ Plateau
//!                       │   ▲                    │   ▲
//!                 strain│   │cooldown      strain│   │cooldown
//!                       ▼   │                    ▼   │
//!                      Cooldown                 Cooldown
//! ```
//!
//! Speed is recomputed only at sentence boundaries, in steps of
//! `rate / 100 * 25` WPM per 25 words read in the current phase. A strain
//! signal drops the speed and parks the ramp in Cooldown for a number of
//! words, after which it resumes in the phase it interrupted.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{normalize_range, ControllerState, Mode, Phase, SpeedController};
use crate::events::{Notifier, SpeedChangeReason};
use crate::strain::{StrainConfig, StrainDetector};
use crate::timing::{DEFAULT_WPM, MAX_WPM};

const WORDS_PER_STEP: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub start_speed: u32,
    pub max_speed: u32,
    pub stabilization_words: u32,
    pub acceleration_words: u32,
    /// WPM gained per 100 words during stabilization
    pub stabilization_rate: f64,
    /// WPM gained per 100 words during acceleration
    pub acceleration_rate: f64,
    pub strain_dropback: u32,
    pub strain_cooldown_words: u32,
    pub pause_threshold_ms: u64,
    pub rewind_threshold_words: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::seeded(DEFAULT_WPM)
    }
}

impl TrainingConfig {
    /// Defaults starting at `speed` with 200 WPM of headroom
    pub fn seeded(speed: u32) -> Self {
        let strain = StrainConfig::default();
        let (start_speed, max_speed) = normalize_range(speed, speed.saturating_add(200).min(MAX_WPM));
        Self {
            start_speed,
            max_speed,
            stabilization_words: 200,
            acceleration_words: 300,
            stabilization_rate: 5.0,
            acceleration_rate: 15.0,
            strain_dropback: 50,
            strain_cooldown_words: 100,
            pause_threshold_ms: strain.pause_threshold_ms,
            rewind_threshold_words: strain.rewind_threshold_words,
        }
    }

    fn normalized(mut self) -> Self {
        (self.start_speed, self.max_speed) = normalize_range(self.start_speed, self.max_speed);
        self.stabilization_rate = self.stabilization_rate.max(0.0);
        self.acceleration_rate = self.acceleration_rate.max(0.0);
        self
    }

    pub fn strain_config(&self) -> StrainConfig {
        StrainConfig {
            pause_threshold_ms: self.pause_threshold_ms,
            rewind_threshold_words: self.rewind_threshold_words,
        }
    }

    /// Gain credited to the acceleration phase for a full stabilization run
    fn stabilization_gain(&self) -> f64 {
        self.stabilization_words as f64 / 100.0 * self.stabilization_rate
    }
}

/// What the ramp was doing when strain interrupted it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StrainSnapshot {
    phase: Phase,
    speed: u32,
}

#[derive(Debug)]
pub struct TrainingRamp {
    config: TrainingConfig,
    state: ControllerState,
    words_in_phase: u32,
    cooldown_words: u32,
    interrupted: Option<StrainSnapshot>,
    detector: StrainDetector,
    notifier: Notifier,
}

impl TrainingRamp {
    pub fn new(config: TrainingConfig, notifier: Notifier) -> Self {
        let config = config.normalized();
        Self {
            state: ControllerState::new(Mode::Training, config.start_speed, config.max_speed),
            words_in_phase: 0,
            cooldown_words: 0,
            interrupted: None,
            detector: StrainDetector::new(config.strain_config(), notifier.clone()),
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn words_in_phase(&self) -> u32 {
        self.words_in_phase
    }

    pub fn strain_detector(&self) -> &StrainDetector {
        &self.detector
    }

    /// Speed the current phase calls for given the words read in it.
    ///
    /// Acceleration is offset by the gain of a complete stabilization run
    /// rather than the speed actually reached when the phase changed.
    pub fn target_speed(&self) -> u32 {
        let steps = (self.words_in_phase / WORDS_PER_STEP) as f64;
        let step_size = |rate: f64| rate / 100.0 * WORDS_PER_STEP as f64;
        let start = self.config.start_speed as f64;

        let target = match self.state.phase {
            Phase::Stabilization => start + steps * step_size(self.config.stabilization_rate),
            Phase::Acceleration => {
                start
                    + self.config.stabilization_gain()
                    + steps * step_size(self.config.acceleration_rate)
            }
            Phase::Idle | Phase::Plateau | Phase::Cooldown => return self.state.current_speed,
        };

        target.min(self.config.max_speed as f64).round() as u32
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.notifier.phase_changed(phase);
        }
    }

    fn set_speed(&mut self, speed: u32, reason: SpeedChangeReason) -> bool {
        if speed == self.state.current_speed {
            return false;
        }
        self.state.current_speed = speed;
        self.notifier.speed_changed(speed, reason);
        true
    }

    fn recompute_speed(&mut self) {
        let target = self.target_speed();
        self.set_speed(target, SpeedChangeReason::Ramp);
    }

    fn advance_phase(&mut self) {
        if self.state.current_speed >= self.config.max_speed {
            self.enter_plateau();
            return;
        }

        match self.state.phase {
            Phase::Stabilization if self.words_in_phase >= self.config.stabilization_words => {
                self.words_in_phase = 0;
                self.set_phase(Phase::Acceleration);
            }
            Phase::Acceleration
                if self.state.words_read
                    >= self
                        .config
                        .stabilization_words
                        .saturating_add(self.config.acceleration_words) =>
            {
                self.enter_plateau();
            }
            _ => {}
        }
    }

    fn enter_plateau(&mut self) {
        self.set_phase(Phase::Plateau);
        self.set_speed(self.config.max_speed, SpeedChangeReason::Ramp);
        self.notifier.max_reached();
    }

    fn count_cooldown_word(&mut self) {
        self.cooldown_words += 1;
        if self.cooldown_words < self.config.strain_cooldown_words {
            return;
        }

        let (resume_phase, speed_before_strain) = match self.interrupted.take() {
            Some(snapshot) => (snapshot.phase, Some(snapshot.speed)),
            None => (Phase::Stabilization, None),
        };
        info!(
            phase = %resume_phase,
            ?speed_before_strain,
            speed = self.state.current_speed,
            "cooldown finished"
        );
        self.words_in_phase = 0;
        self.cooldown_words = 0;
        self.set_phase(resume_phase);
    }

    fn adapt_to_strain(&mut self) {
        match self.state.phase {
            Phase::Stabilization | Phase::Acceleration => {
                self.interrupted = Some(StrainSnapshot {
                    phase: self.state.phase,
                    speed: self.state.current_speed,
                });
            }
            // Repeated strain extends the cooldown but keeps the first snapshot
            Phase::Cooldown => {}
            Phase::Idle | Phase::Plateau => return,
        }

        let dropped = self
            .state
            .current_speed
            .saturating_sub(self.config.strain_dropback)
            .max(self.config.start_speed);
        info!(
            from = self.state.current_speed,
            to = dropped,
            "adapting to strain"
        );

        self.set_phase(Phase::Cooldown);
        self.cooldown_words = 0;
        self.state.current_speed = dropped;
        self.notifier
            .speed_changed(dropped, SpeedChangeReason::StrainAdapt);
    }
}

impl SpeedController for TrainingRamp {
    fn mode(&self) -> Mode {
        Mode::Training
    }

    fn current_speed(&self) -> u32 {
        self.state.current_speed
    }

    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn progress(&self) -> f64 {
        if self.state.phase == Phase::Plateau {
            return 100.0;
        }
        let range = self.config.max_speed.saturating_sub(self.config.start_speed);
        if range == 0 {
            return 100.0;
        }
        let gained = self.state.current_speed.saturating_sub(self.config.start_speed);
        (gained as f64 / range as f64 * 100.0).clamp(0.0, 100.0)
    }

    fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        self.state.is_paused = false;
        if self.state.phase == Phase::Idle {
            self.words_in_phase = 0;
            self.set_phase(Phase::Stabilization);
        }
        self.detector.enable();
    }

    fn stop(&mut self) {
        self.state.is_running = false;
        self.detector.disable();
    }

    fn pause(&mut self) {
        if self.state.is_running {
            self.state.is_paused = true;
        }
    }

    fn resume(&mut self) {
        self.state.is_paused = false;
    }

    fn reset(&mut self) {
        self.detector.disable();
        self.words_in_phase = 0;
        self.cooldown_words = 0;
        self.interrupted = None;
        self.state = ControllerState::new(
            Mode::Training,
            self.config.start_speed,
            self.config.max_speed,
        );
    }

    fn on_word_read(&mut self, _word: &str, is_sentence_end: bool) {
        if !self.state.is_active() {
            return;
        }
        self.state.words_read += 1;
        self.words_in_phase += 1;

        match self.state.phase {
            Phase::Cooldown => self.count_cooldown_word(),
            Phase::Stabilization | Phase::Acceleration if is_sentence_end => {
                self.recompute_speed();
                self.advance_phase();
            }
            _ => {}
        }
    }

    fn on_user_pause(&mut self, duration_ms: u64) {
        if self.detector.on_user_pause(duration_ms) {
            self.adapt_to_strain();
        }
    }

    fn on_user_rewind(&mut self, words: u32) {
        if self.detector.on_user_rewind(words) {
            self.adapt_to_strain();
        }
    }

    fn set_user_speed(&mut self, wpm: u32) {
        let speed = wpm.clamp(self.config.start_speed, self.config.max_speed);
        if self.set_speed(speed, SpeedChangeReason::UserManual) {
            self.pause();
        }
    }
}
