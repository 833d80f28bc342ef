//! Host-side reading session: the cursor over a document plus the wall-clock
//! and position bookkeeping that turns reader actions into pause durations
//! and rewind distances for the speed controller.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use itertools::{Itertools, MinMaxResult};

use crate::document::{Document, Token};
use crate::time_series::SpeedSample;
use crate::util::{std_dev, time_weighted_mean};

#[derive(Debug, Clone)]
pub struct ReadingSession {
    document: Document,
    /// Index of the next token to show
    position: usize,
    words_shown: usize,
    started_at: Option<Instant>,
    started_local: Option<DateTime<Local>>,
    paused_at: Option<Instant>,
    samples: Vec<SpeedSample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub started: Option<DateTime<Local>>,
    pub words_shown: usize,
    pub elapsed: Duration,
    pub average_wpm: f64,
    pub low_wpm: f64,
    pub peak_wpm: f64,
    pub std_dev: f64,
}

impl ReadingSession {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            position: 0,
            words_shown: 0,
            started_at: None,
            started_local: None,
            paused_at: None,
            samples: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn begin(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.started_local = Some(Local::now());
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Move to the next token and return it
    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.document.get(self.position)?;
        self.position += 1;
        if !token.is_paragraph_break() {
            self.words_shown += 1;
        }
        Some(token)
    }

    /// Token currently on screen
    pub fn current(&self) -> Option<&Token> {
        self.position
            .checked_sub(1)
            .and_then(|idx| self.document.get(idx))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.document.len()
    }

    /// Fraction of the document shown, in `[0, 1]`
    pub fn fraction_read(&self) -> f64 {
        if self.document.is_empty() {
            return 1.0;
        }
        self.position as f64 / self.document.len() as f64
    }

    /// Step back `words` real words; returns how many were actually rewound
    pub fn rewind(&mut self, words: usize) -> u32 {
        let mut moved = 0u32;
        while (moved as usize) < words && self.position > 0 {
            self.position -= 1;
            if self
                .document
                .get(self.position)
                .is_some_and(|t| !t.is_paragraph_break())
            {
                moved += 1;
            }
        }
        moved
    }

    /// Jump ahead `words` real words; returns how many were skipped
    pub fn skip(&mut self, words: usize) -> u32 {
        let mut moved = 0u32;
        while (moved as usize) < words && !self.is_finished() {
            if self
                .document
                .get(self.position)
                .is_some_and(|t| !t.is_paragraph_break())
            {
                moved += 1;
            }
            self.position += 1;
        }
        moved
    }

    /// Returns false if already paused
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// How long the pause that just ended lasted
    pub fn resume(&mut self, now: Instant) -> Option<Duration> {
        self.paused_at
            .take()
            .map(|at| now.saturating_duration_since(at))
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn record_speed(&mut self, now: Instant, wpm: u32) {
        let Some(started) = self.started_at else {
            return;
        };
        let t = now.saturating_duration_since(started).as_secs_f64();
        self.samples.push(SpeedSample::new(t, wpm as f64));
    }

    pub fn samples(&self) -> &[SpeedSample] {
        &self.samples
    }

    pub fn restart(&mut self) {
        *self = Self::new(std::mem::take(&mut self.document));
    }

    pub fn summary(&self, now: Instant) -> SessionSummary {
        let speeds: Vec<f64> = self.samples.iter().map(|s| s.wpm).collect();
        let points: Vec<(f64, f64)> = self.samples.iter().map(|&s| s.into()).collect();
        let (low_wpm, peak_wpm) = match speeds.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        SessionSummary {
            started: self.started_local,
            words_shown: self.words_shown,
            elapsed: self
                .started_at
                .map(|at| now.saturating_duration_since(at))
                .unwrap_or_default(),
            average_wpm: time_weighted_mean(&points).unwrap_or(0.0),
            low_wpm,
            peak_wpm,
            std_dev: std_dev(&speeds).unwrap_or(0.0),
        }
    }
}
