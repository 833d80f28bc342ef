use tracing::info;

use crate::clock::Clock;
use crate::events::Notifier;
use crate::ramp::{ControllerState, Mode, ModeConfig, Phase, RampPolicy, SpeedController};

/// Facade owning the active ramp policy.
///
/// Switching modes replaces the policy wholesale, so no phase or word-count
/// state carries across a switch. All notifications go out through the
/// notifier handed in at construction; the same notifier is passed to every
/// policy this facade creates.
#[derive(Debug)]
pub struct SpeedControl<C: Clock + Clone> {
    policy: RampPolicy<C>,
    config: ModeConfig,
    clock: C,
    notifier: Notifier,
    ramp_frozen: bool,
    progress: f64,
}

impl<C: Clock + Clone> SpeedControl<C> {
    pub fn new(config: ModeConfig, clock: C, notifier: Notifier) -> Self {
        let policy = RampPolicy::from_config(config.clone(), clock.clone(), notifier.clone());
        let progress = policy.progress();
        Self {
            policy,
            config,
            clock,
            notifier,
            ramp_frozen: false,
            progress,
        }
    }

    pub fn mode(&self) -> Mode {
        self.policy.mode()
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn policy(&self) -> &RampPolicy<C> {
        &self.policy
    }

    /// Replace the active policy.
    ///
    /// Without a config, or with one for a different mode, the new policy
    /// gets that mode's defaults seeded from the speed currently shown.
    pub fn set_mode(&mut self, mode: Mode, config: Option<ModeConfig>) {
        let seed_speed = self.policy.current_speed();
        self.policy.stop();

        let config = match config {
            Some(config) if config.mode() == mode => config,
            _ => ModeConfig::seeded(mode, seed_speed),
        };
        info!(from = %self.policy.mode(), to = %mode, seed_speed, "switching speed mode");

        self.policy = RampPolicy::from_config(config.clone(), self.clock.clone(), self.notifier.clone());
        self.config = config;
        self.progress = self.policy.progress();
    }

    /// Freeze ramp progression without touching playback
    pub fn set_ramp_frozen(&mut self, frozen: bool) {
        self.ramp_frozen = frozen;
    }

    pub fn is_ramp_frozen(&self) -> bool {
        self.ramp_frozen
    }

    pub fn on_word_read(&mut self, word: &str, is_sentence_end: bool) {
        if !self.ramp_frozen {
            self.policy.on_word_read(word, is_sentence_end);
        }
        self.progress = self.policy.progress();
    }

    pub fn on_user_pause(&mut self, duration_ms: u64) {
        self.policy.on_user_pause(duration_ms);
        self.progress = self.policy.progress();
    }

    pub fn on_user_rewind(&mut self, words: u32) {
        self.policy.on_user_rewind(words);
        self.progress = self.policy.progress();
    }

    pub fn set_user_speed(&mut self, wpm: u32) {
        self.policy.set_user_speed(wpm);
        self.progress = self.policy.progress();
    }

    pub fn start(&mut self) {
        self.policy.start();
    }

    pub fn stop(&mut self) {
        self.policy.stop();
    }

    pub fn pause(&mut self) {
        self.policy.pause();
    }

    pub fn resume(&mut self) {
        self.policy.resume();
    }

    pub fn reset(&mut self) {
        self.policy.reset();
        self.progress = self.policy.progress();
    }

    pub fn current_speed(&self) -> u32 {
        self.policy.current_speed()
    }

    pub fn phase(&self) -> Phase {
        self.policy.phase()
    }

    pub fn state(&self) -> ControllerState {
        self.policy.state()
    }

    /// Progress as of the last event routed through the facade
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn punctuation_scale(&self) -> f64 {
        self.policy.punctuation_scale()
    }
}
