use std::sync::mpsc::Receiver;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::Settings;
use crate::controller::SpeedControl;
use crate::document::{Document, Token};
use crate::events::{Notifier, RampEvent, SpeedChangeReason};
use crate::ramp::{ControllerState, Phase};
use crate::session::{ReadingSession, SessionSummary};
use crate::timing::{Scheduler, SchedulerEvent};

/// Words moved by a single rewind or skip
pub const JUMP_WORDS: usize = 10;
/// WPM change per manual speed key press
pub const SPEED_STEP: u32 = 25;

/// A document being read: ties the session cursor, the frame scheduler and
/// the speed controller together.
///
/// All time comes from the injected clock, so the whole reading loop can be
/// stepped deterministically in tests.
#[derive(Debug)]
pub struct Reader<C: Clock + Clone> {
    session: ReadingSession,
    scheduler: Scheduler<C>,
    control: SpeedControl<C>,
    events: Receiver<RampEvent>,
    settings: Settings,
    clock: C,
    notice: Option<String>,
    finished: bool,
}

impl<C: Clock + Clone> Reader<C> {
    pub fn new(document: Document, settings: Settings, clock: C) -> Self {
        let (notifier, events) = Notifier::channel();
        let control = SpeedControl::new(settings.mode_config(), clock.clone(), notifier);
        let scheduler = Scheduler::new(settings.timing, clock.clone());

        let mut reader = Self {
            session: ReadingSession::new(document),
            scheduler,
            control,
            events,
            settings,
            clock,
            notice: None,
            finished: false,
        };
        reader.sync_speed();
        reader
    }

    /// Show the first word and start the clocks
    pub fn start(&mut self) {
        if self.session.has_started() {
            return;
        }
        let now = self.clock.now();
        self.session.begin(now);
        self.control.start();
        self.scheduler.start();
        self.session.record_speed(now, self.control.current_speed());
        self.advance_word();
        info!(
            mode = %self.control.mode(),
            words = self.session.document().word_count(),
            "reading started"
        );
    }

    /// Feed one render frame; true when the displayed word changed
    pub fn on_frame(&mut self) -> bool {
        match self.scheduler.on_frame() {
            Some(SchedulerEvent::Tick) => {
                self.advance_word();
                true
            }
            _ => false,
        }
    }

    fn advance_word(&mut self) {
        let Some(token) = self.session.advance().cloned() else {
            self.finish();
            return;
        };

        self.scheduler.set_current_word(token.text.as_str());
        // Paragraph markers hold the screen but aren't words
        if !token.is_paragraph_break() {
            self.control.on_word_read(&token.text, token.sentence_end);
        }
        self.sync_speed();
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        let completed = self.scheduler.complete();
        debug!(?completed, "end of document");
        self.control.stop();
        let now = self.clock.now();
        self.session.record_speed(now, self.control.current_speed());
        self.finished = true;
        self.drain_events();
        let summary = self.session.summary(now);
        info!(
            words = summary.words_shown,
            average_wpm = summary.average_wpm,
            peak_wpm = summary.peak_wpm,
            "reading finished"
        );
    }

    /// Push the controller's speed into the scheduler
    fn sync_speed(&mut self) {
        let wpm = self.control.current_speed();
        if wpm != self.scheduler.config().words_per_minute {
            self.scheduler.set_wpm(wpm);
            self.session.record_speed(self.clock.now(), wpm);
        }

        // Only demo mode scales pauses; the other policies report 1.0
        let pauses = self
            .settings
            .timing
            .punctuation_pauses
            .scaled(self.control.punctuation_scale());
        if pauses != self.scheduler.config().punctuation_pauses {
            self.scheduler.set_punctuation_pauses(pauses);
        }
        self.drain_events();
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let notice = match event {
                RampEvent::SpeedChanged {
                    speed,
                    reason: SpeedChangeReason::StrainAdapt,
                } => format!("easing off to {speed} wpm"),
                RampEvent::SpeedChanged { .. } => continue,
                RampEvent::PhaseChanged(Phase::Idle) => continue,
                RampEvent::PhaseChanged(phase) => format!("{phase}"),
                RampEvent::MaxReached => "top speed reached".to_string(),
                RampEvent::StrainDetected(signal) => format!("strain: {signal}"),
            };
            self.notice = Some(notice);
        }
    }

    /// Space bar. Returns true when now paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.finished {
            return false;
        }
        let now = self.clock.now();
        match self.session.resume(now) {
            Some(paused_for) => {
                self.control.resume();
                self.scheduler.start();
                self.control.on_user_pause(paused_for.as_millis() as u64);
                self.sync_speed();
                false
            }
            None => {
                self.session.pause(now);
                self.scheduler.stop();
                self.control.pause();
                true
            }
        }
    }

    pub fn rewind(&mut self) {
        if self.finished {
            return;
        }
        let moved = self.session.rewind(JUMP_WORDS);
        if moved == 0 {
            return;
        }
        self.control.on_user_rewind(moved);
        self.jumped();
    }

    pub fn skip(&mut self) {
        if self.finished {
            return;
        }
        self.session.skip(JUMP_WORDS);
        if self.session.is_finished() {
            self.finish();
            return;
        }
        self.jumped();
    }

    fn jumped(&mut self) {
        let text = self
            .session
            .current()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        self.scheduler.set_current_word(text);
        if self.scheduler.is_running() {
            // Restart the interval for the word now on screen
            self.scheduler.stop();
            self.scheduler.start();
        }
        self.sync_speed();
    }

    pub fn speed_up(&mut self) {
        self.adjust_speed(self.control.current_speed().saturating_add(SPEED_STEP));
    }

    pub fn slow_down(&mut self) {
        self.adjust_speed(self.control.current_speed().saturating_sub(SPEED_STEP));
    }

    fn adjust_speed(&mut self, wpm: u32) {
        self.control.set_user_speed(wpm);
        self.sync_speed();
    }

    /// Switch to the next mode with its stored tuning
    pub fn cycle_mode(&mut self) {
        let next = self.control.mode().next();
        self.control
            .set_mode(next, Some(self.settings.config_for(next)));
        self.settings.mode = next;
        if self.session.has_started() && !self.finished {
            self.control.start();
            if self.session.is_paused() {
                self.control.pause();
            }
        }
        self.notice = Some(format!("{next} mode"));
        self.sync_speed();
    }

    pub fn toggle_ramp_freeze(&mut self) -> bool {
        let frozen = !self.control.is_ramp_frozen();
        self.control.set_ramp_frozen(frozen);
        self.notice = Some(if frozen { "ramp frozen" } else { "ramp running" }.to_string());
        frozen
    }

    /// Back to the first word with a fresh ramp
    pub fn restart(&mut self) {
        self.scheduler.stop();
        self.control.reset();
        self.session.restart();
        self.finished = false;
        self.notice = None;
        self.sync_speed();
        self.start();
    }

    pub fn current(&self) -> Option<&Token> {
        self.session.current()
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    pub fn control(&self) -> &SpeedControl<C> {
        &self.control
    }

    pub fn state(&self) -> ControllerState {
        self.control.state()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// How long the word on screen is held at the current speed
    pub fn current_interval_ms(&self) -> u32 {
        self.scheduler.current_interval_ms()
    }

    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    pub fn has_finished(&self) -> bool {
        self.finished
    }

    pub fn summary(&self) -> SessionSummary {
        self.session.summary(self.clock.now())
    }
}
