//! Time-driven demo ramp: speed follows an ease-out curve of elapsed reading
//! time, independent of sentence boundaries or reader behavior.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{normalize_range, ControllerState, Mode, Phase, SpeedController};
use crate::clock::Clock;
use crate::events::{Notifier, SpeedChangeReason};
use crate::timing::{DEFAULT_WPM, MAX_WPM};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub start_speed: u32,
    pub max_speed: u32,
    pub ramp_duration_seconds: f64,
    pub reduce_punctuation_pauses: bool,
    /// Punctuation pause multiplier once max speed is reached
    pub punctuation_reduction_factor: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::seeded(DEFAULT_WPM)
    }
}

impl DemoConfig {
    /// Defaults starting at `speed` with 300 WPM of headroom over one minute
    pub fn seeded(speed: u32) -> Self {
        let (start_speed, max_speed) = normalize_range(speed, speed.saturating_add(300).min(MAX_WPM));
        Self {
            start_speed,
            max_speed,
            ramp_duration_seconds: 60.0,
            reduce_punctuation_pauses: true,
            punctuation_reduction_factor: 0.5,
        }
    }

    fn normalized(mut self) -> Self {
        (self.start_speed, self.max_speed) = normalize_range(self.start_speed, self.max_speed);
        self.punctuation_reduction_factor = self.punctuation_reduction_factor.clamp(0.0, 1.0);
        self
    }
}

/// Quadratic ease-out: fast early, tapering toward the end
pub fn ease_out(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(2)
}

#[derive(Debug)]
pub struct DemoRamp<C: Clock> {
    config: DemoConfig,
    state: ControllerState,
    clock: C,
    started_at: Option<Instant>,
    /// Set while paused or stopped; the interval is excluded from ramp time
    halted_at: Option<Instant>,
    halted_total: Duration,
    notifier: Notifier,
}

impl<C: Clock> DemoRamp<C> {
    pub fn new(config: DemoConfig, clock: C, notifier: Notifier) -> Self {
        let config = config.normalized();
        Self {
            state: ControllerState::new(Mode::Demo, config.start_speed, config.max_speed),
            config,
            clock,
            started_at: None,
            halted_at: None,
            halted_total: Duration::ZERO,
            notifier,
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Ramp time so far, excluding paused and stopped intervals
    pub fn elapsed(&self) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::ZERO;
        };
        let until = self.halted_at.unwrap_or_else(|| self.clock.now());
        until
            .saturating_duration_since(started)
            .saturating_sub(self.halted_total)
    }

    /// Linear time progress in `[0, 1]`
    pub fn ramp_progress(&self) -> f64 {
        if self.config.ramp_duration_seconds <= 0.0 {
            return 1.0;
        }
        (self.elapsed().as_secs_f64() / self.config.ramp_duration_seconds).min(1.0)
    }

    pub fn target_speed(&self) -> u32 {
        let start = self.config.start_speed as f64;
        let span = self.config.max_speed.saturating_sub(self.config.start_speed) as f64;
        (start + span * ease_out(self.ramp_progress())).round() as u32
    }

    /// Multiplier for punctuation pauses: 1.0 at the start speed, falling
    /// linearly to the reduction factor at max speed
    pub fn punctuation_scale(&self) -> f64 {
        if !self.config.reduce_punctuation_pauses {
            return 1.0;
        }
        let span = self.config.max_speed.saturating_sub(self.config.start_speed);
        if span == 0 {
            return 1.0;
        }
        let gained = self.state.current_speed.saturating_sub(self.config.start_speed);
        let t = (gained as f64 / span as f64).clamp(0.0, 1.0);
        1.0 - t * (1.0 - self.config.punctuation_reduction_factor)
    }

    fn halt(&mut self) {
        if self.halted_at.is_none() {
            self.halted_at = Some(self.clock.now());
        }
    }

    fn unhalt(&mut self) {
        if let Some(at) = self.halted_at.take() {
            self.halted_total += self.clock.now().saturating_duration_since(at);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.notifier.phase_changed(phase);
        }
    }
}

impl<C: Clock> SpeedController for DemoRamp<C> {
    fn mode(&self) -> Mode {
        Mode::Demo
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
        self.ramp_progress() * 100.0
    }

    fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        self.state.is_paused = false;
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
            self.halted_at = None;
            self.halted_total = Duration::ZERO;
        } else {
            self.unhalt();
        }
        if self.state.phase == Phase::Idle {
            // No slow-start phase in demo mode
            self.set_phase(Phase::Acceleration);
        }
    }

    fn stop(&mut self) {
        if !self.state.is_running {
            return;
        }
        self.state.is_running = false;
        self.halt();
    }

    fn pause(&mut self) {
        if self.state.is_running && !self.state.is_paused {
            self.state.is_paused = true;
            self.halt();
        }
    }

    fn resume(&mut self) {
        if self.state.is_paused {
            self.state.is_paused = false;
            self.unhalt();
        }
    }

    fn reset(&mut self) {
        self.started_at = None;
        self.halted_at = None;
        self.halted_total = Duration::ZERO;
        self.state = ControllerState::new(Mode::Demo, self.config.start_speed, self.config.max_speed);
    }

    fn on_word_read(&mut self, _word: &str, _is_sentence_end: bool) {
        if !self.state.is_active() {
            return;
        }
        self.state.words_read += 1;
        if self.state.phase == Phase::Plateau {
            return;
        }

        let target = self.target_speed();
        if target != self.state.current_speed {
            debug!(elapsed = ?self.elapsed(), target, "demo ramp");
            self.state.current_speed = target;
            self.notifier.speed_changed(target, SpeedChangeReason::Ramp);
        }

        if self.state.current_speed >= self.config.max_speed {
            self.set_phase(Phase::Plateau);
            self.notifier.max_reached();
        }
    }

    fn on_user_pause(&mut self, _duration_ms: u64) {}

    fn on_user_rewind(&mut self, _words: u32) {}

    fn set_user_speed(&mut self, wpm: u32) {
        let speed = wpm.clamp(self.config.start_speed, self.config.max_speed);
        if speed != self.state.current_speed {
            self.state.current_speed = speed;
            self.notifier
                .speed_changed(speed, SpeedChangeReason::UserManual);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::RampEvent;
    use std::sync::mpsc::Receiver;

    fn config(start: u32, max: u32, secs: f64) -> DemoConfig {
        DemoConfig {
            start_speed: start,
            max_speed: max,
            ramp_duration_seconds: secs,
            ..DemoConfig::default()
        }
    }

    fn started(cfg: DemoConfig) -> (DemoRamp<ManualClock>, ManualClock, Receiver<RampEvent>) {
        let clock = ManualClock::new();
        let (notifier, rx) = Notifier::channel();
        let mut ramp = DemoRamp::new(cfg, clock.clone(), notifier);
        ramp.start();
        (ramp, clock, rx)
    }

    #[test]
    fn ease_out_is_front_loaded() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(0.5), 0.75);
        assert_eq!(ease_out(1.0), 1.0);
        assert_eq!(ease_out(3.0), 1.0);
    }

    #[test]
    fn start_skips_to_acceleration() {
        let (ramp, _clock, rx) = started(config(300, 700, 60.0));
        assert_eq!(ramp.phase(), Phase::Acceleration);
        assert_eq!(rx.try_recv(), Ok(RampEvent::PhaseChanged(Phase::Acceleration)));
    }

    #[test]
    fn halfway_is_three_quarters_of_the_range() {
        let (mut ramp, clock, _rx) = started(config(300, 700, 60.0));
        clock.advance(Duration::from_secs(30));
        ramp.on_word_read("word", false);
        assert_eq!(ramp.current_speed(), 600);
        assert_eq!(ramp.progress(), 50.0);
    }

    #[test]
    fn reaching_max_enters_plateau_once() {
        let (mut ramp, clock, rx) = started(config(300, 700, 10.0));
        clock.advance(Duration::from_secs(12));
        ramp.on_word_read("a", false);
        ramp.on_word_read("b", false);

        assert_eq!(ramp.current_speed(), 700);
        assert_eq!(ramp.phase(), Phase::Plateau);
        assert_eq!(ramp.progress(), 100.0);
        let max_events = rx.try_iter().filter(|e| *e == RampEvent::MaxReached).count();
        assert_eq!(max_events, 1);
    }

    #[test]
    fn paused_time_is_excluded() {
        let (mut ramp, clock, _rx) = started(config(300, 700, 60.0));
        clock.advance(Duration::from_secs(10));
        ramp.pause();
        clock.advance(Duration::from_secs(100));
        ramp.on_word_read("ignored", false);
        assert_eq!(ramp.current_speed(), 300);
        ramp.resume();
        clock.advance(Duration::from_secs(20));
        assert_eq!(ramp.elapsed(), Duration::from_secs(30));
        ramp.on_word_read("word", false);
        assert_eq!(ramp.current_speed(), 600);
    }

    #[test]
    fn stopped_time_is_excluded() {
        let (mut ramp, clock, _rx) = started(config(300, 700, 60.0));
        clock.advance(Duration::from_secs(15));
        ramp.stop();
        clock.advance(Duration::from_secs(300));
        ramp.start();
        clock.advance(Duration::from_secs(15));
        assert_eq!(ramp.elapsed(), Duration::from_secs(30));
    }

    #[test]
    fn behavior_signals_are_ignored() {
        let (mut ramp, clock, _rx) = started(config(300, 700, 60.0));
        clock.advance(Duration::from_secs(30));
        ramp.on_user_pause(60_000);
        ramp.on_user_rewind(1000);
        ramp.on_word_read("word", true);
        assert_eq!(ramp.current_speed(), 600);
        assert_eq!(ramp.phase(), Phase::Acceleration);
    }

    #[test]
    fn punctuation_scale_interpolates_over_speed() {
        let (mut ramp, clock, _rx) = started(config(300, 700, 60.0));
        assert_eq!(ramp.punctuation_scale(), 1.0);
        clock.advance(Duration::from_secs(30));
        ramp.on_word_read("word", false);
        assert!((ramp.punctuation_scale() - 0.625).abs() < 1e-9);
        clock.advance(Duration::from_secs(30));
        ramp.on_word_read("word", false);
        assert!((ramp.punctuation_scale() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn punctuation_scale_disabled() {
        let cfg = DemoConfig {
            reduce_punctuation_pauses: false,
            ..config(300, 700, 1.0)
        };
        let (mut ramp, clock, _rx) = started(cfg);
        clock.advance(Duration::from_secs(5));
        ramp.on_word_read("word", false);
        assert_eq!(ramp.punctuation_scale(), 1.0);
    }

    #[test]
    fn zero_duration_jumps_to_max() {
        let (mut ramp, _clock, _rx) = started(config(300, 700, 0.0));
        ramp.on_word_read("word", false);
        assert_eq!(ramp.current_speed(), 700);
        assert_eq!(ramp.phase(), Phase::Plateau);
    }

    #[test]
    fn reset_clears_ramp_time() {
        let (mut ramp, clock, _rx) = started(config(300, 700, 60.0));
        clock.advance(Duration::from_secs(30));
        ramp.on_word_read("word", false);
        ramp.reset();
        assert_eq!(ramp.elapsed(), Duration::ZERO);
        assert_eq!(ramp.current_speed(), 300);
        assert_eq!(ramp.phase(), Phase::Idle);
    }
}
