//! Event plumbing between the terminal and the reading loop.
//!
//! Terminal input arrives from a reader thread over a channel. The [`Runner`]
//! interleaves it with [`ReaderEvent::Frame`] at a fixed cadence; frames are
//! what drive the timing scheduler, so they must keep coming even while the
//! reader is holding a key down.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::debug;

/// Default frame cadence, roughly 60 frames per second
pub const FRAME_INTERVAL_MS: u64 = 16;

#[derive(Clone, Debug)]
pub enum ReaderEvent {
    Key(KeyEvent),
    Resize,
    Frame,
}

/// Source of terminal events (keyboard, resize)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ReaderEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let event = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => ReaderEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => ReaderEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    debug!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(FRAME_INTERVAL_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for tests
pub struct TestEventSource {
    rx: Receiver<ReaderEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ReaderEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_frame: Instant,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_frame = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_frame,
        }
    }

    /// Next event, or `Frame` once the frame deadline passes.
    ///
    /// A disconnected source degrades to a plain frame clock.
    pub fn step(&mut self) -> ReaderEvent {
        let now = Instant::now();
        if now >= self.next_frame {
            return self.frame(now);
        }

        match self.event_source.recv_timeout(self.next_frame - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.frame(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(self.next_frame.saturating_duration_since(Instant::now()));
                self.frame(Instant::now())
            }
        }
    }

    fn frame(&mut self, now: Instant) -> ReaderEvent {
        // Don't try to catch up on missed frames; the scheduler measures
        // real elapsed time anyway.
        self.next_frame = now + self.ticker.interval();
        ReaderEvent::Frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_frame_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(1)));
        assert_matches!(runner.step(), ReaderEvent::Frame);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(ReaderEvent::Resize).unwrap();
        let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(50)));
        assert_matches!(runner.step(), ReaderEvent::Resize);
    }

    #[test]
    fn frames_keep_coming_under_key_flood() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..10_000 {
            tx.send(ReaderEvent::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)))
                .unwrap();
        }
        let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(2)));
        let start = Instant::now();
        let mut saw_frame = false;
        while start.elapsed() < Duration::from_secs(1) {
            if matches!(runner.step(), ReaderEvent::Frame) {
                saw_frame = true;
                break;
            }
        }
        assert!(saw_frame);
    }

    #[test]
    fn disconnected_source_still_frames() {
        let (tx, rx) = mpsc::channel::<ReaderEvent>();
        drop(tx);
        let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(1)));
        assert_matches!(runner.step(), ReaderEvent::Frame);
        assert_matches!(runner.step(), ReaderEvent::Frame);
    }

    #[test]
    fn default_ticker_uses_frame_cadence() {
        assert_eq!(FixedTicker::default().interval(), Duration::from_millis(FRAME_INTERVAL_MS));
    }
}
