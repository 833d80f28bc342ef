//! Word timing: WPM to interval conversion, punctuation-aware pacing, and the
//! frame-driven scheduler that decides when the next word is due.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

/// Sentinel token the tokenizer emits between paragraphs
pub const PARAGRAPH_MARKER: &str = "\u{00B6}";

pub const MIN_WPM: u32 = 100;
pub const MAX_WPM: u32 = 1000;
pub const DEFAULT_WPM: u32 = 300;

/// Extra display time in milliseconds, keyed by the trailing punctuation of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationPauses {
    pub comma: u32,
    pub semicolon: u32,
    pub colon: u32,
    pub period: u32,
    pub question: u32,
    pub exclamation: u32,
    pub paragraph: u32,
}

impl Default for PunctuationPauses {
    fn default() -> Self {
        Self {
            comma: 50,
            semicolon: 100,
            colon: 100,
            period: 150,
            question: 150,
            exclamation: 150,
            paragraph: 300,
        }
    }
}

impl PunctuationPauses {
    /// Additive pause for `word`. The paragraph marker replaces the
    /// character-based pause rather than stacking with it.
    pub fn pause_for(&self, word: &str) -> u32 {
        if word == PARAGRAPH_MARKER {
            return self.paragraph;
        }

        match word.chars().last() {
            Some(',') => self.comma,
            Some(';') => self.semicolon,
            Some(':') => self.colon,
            Some('.') => self.period,
            Some('?') => self.question,
            Some('!') => self.exclamation,
            _ => 0,
        }
    }

    /// Every pause multiplied by `factor`, rounded to whole milliseconds
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |ms: u32| (ms as f64 * factor).round() as u32;
        Self {
            comma: scale(self.comma),
            semicolon: scale(self.semicolon),
            colon: scale(self.colon),
            period: scale(self.period),
            question: scale(self.question),
            exclamation: scale(self.exclamation),
            paragraph: scale(self.paragraph),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub words_per_minute: u32,
    pub punctuation_pauses_enabled: bool,
    pub punctuation_pauses: PunctuationPauses,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WPM,
            punctuation_pauses_enabled: true,
            punctuation_pauses: PunctuationPauses::default(),
        }
    }
}

impl TimingConfig {
    /// Full display interval for `word` at the configured speed
    pub fn interval_for(&self, word: &str) -> u32 {
        let base = wpm_to_ms(self.words_per_minute);
        if self.punctuation_pauses_enabled {
            base + self.punctuation_pauses.pause_for(word)
        } else {
            base
        }
    }
}

/// Base interval per word: `round(60000 / wpm)`. A zero speed is treated as 1 WPM.
pub fn wpm_to_ms(wpm: u32) -> u32 {
    (60_000.0 / wpm.max(1) as f64).round() as u32
}

/// Extra hold time `pauses` assigns to `word`
pub fn punctuation_pause(word: &str, pauses: &PunctuationPauses) -> u32 {
    pauses.pause_for(word)
}

/// Display time for `word` at `wpm` using the default punctuation table
pub fn word_display_time(word: &str, wpm: u32, punctuation_enabled: bool) -> u32 {
    TimingConfig {
        words_per_minute: wpm,
        punctuation_pauses_enabled: punctuation_enabled,
        punctuation_pauses: PunctuationPauses::default(),
    }
    .interval_for(word)
}

/// What a frame (or an explicit completion) produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The current word's interval elapsed; the host should show the next word
    Tick,
    /// End of document; distinct from a plain stop
    Completed,
}

/// Transient loop state, reset on every `start()`
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub is_running: bool,
    pub last_tick: Option<Instant>,
    pub accumulated_ms: f64,
    pub current_word: String,
}

/// Drift-corrected word scheduler.
///
/// The host calls [`Scheduler::on_frame`] at whatever cadence its frame loop
/// runs. Elapsed time is accumulated and the due interval is subtracted on
/// each tick, so fractional overflow carries into the next word instead of
/// being dropped.
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    config: TimingConfig,
    state: SchedulerState,
    clock: C,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(config: TimingConfig, clock: C) -> Self {
        Self {
            config,
            state: SchedulerState::default(),
            clock,
        }
    }

    pub fn configure(&mut self, wpm: u32, punctuation_enabled: bool, pauses: PunctuationPauses) {
        self.config = TimingConfig {
            words_per_minute: wpm,
            punctuation_pauses_enabled: punctuation_enabled,
            punctuation_pauses: pauses,
        };
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        self.state.last_tick = Some(self.clock.now());
        self.state.accumulated_ms = 0.0;
        debug!(wpm = self.config.words_per_minute, "scheduler started");
    }

    pub fn stop(&mut self) {
        if self.state.is_running {
            debug!("scheduler stopped");
        }
        self.state.is_running = false;
    }

    /// Stop the loop and report end of document
    pub fn complete(&mut self) -> SchedulerEvent {
        self.stop();
        debug!("scheduler completed");
        SchedulerEvent::Completed
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn set_wpm(&mut self, wpm: u32) {
        self.config.words_per_minute = wpm;
    }

    pub fn set_punctuation_pauses(&mut self, pauses: PunctuationPauses) {
        self.config.punctuation_pauses = pauses;
    }

    pub fn set_current_word(&mut self, text: impl Into<String>) {
        self.state.current_word = text.into();
    }

    /// Interval the current word must stay on screen
    pub fn current_interval_ms(&self) -> u32 {
        self.config.interval_for(&self.state.current_word)
    }

    /// Advance the loop by one frame. At most one tick is produced per frame.
    pub fn on_frame(&mut self) -> Option<SchedulerEvent> {
        if !self.state.is_running {
            return None;
        }

        let now = self.clock.now();
        let delta_ms = match self.state.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f64() * 1000.0,
            None => 0.0,
        };
        self.state.last_tick = Some(now);
        self.state.accumulated_ms += delta_ms;

        let target = self.current_interval_ms() as f64;
        if self.state.accumulated_ms >= target {
            self.state.accumulated_ms -= target;
            trace!(
                target_ms = target,
                carry_ms = self.state.accumulated_ms,
                "word due"
            );
            Some(SchedulerEvent::Tick)
        } else {
            None
        }
    }
}
