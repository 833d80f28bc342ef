use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info};

use crate::ramp::Phase;
use crate::strain::StrainSignal;

/// Why the displayed speed changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SpeedChangeReason {
    Ramp,
    StrainAdapt,
    UserManual,
}

/// Notification emitted by the speed-control engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampEvent {
    SpeedChanged {
        speed: u32,
        reason: SpeedChangeReason,
    },
    PhaseChanged(Phase),
    MaxReached,
    StrainDetected(StrainSignal),
}

/// Outbound notification handle shared by a policy and its strain detector.
///
/// Events are queued before the emitting call returns. A notifier without a
/// receiver (or whose receiver was dropped) silently discards events.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<Sender<RampEvent>>,
}

impl Notifier {
    pub fn new(tx: Sender<RampEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    /// Notifier plus the receiving end the host drains
    pub fn channel() -> (Self, Receiver<RampEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }

    fn emit(&self, event: RampEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn speed_changed(&self, speed: u32, reason: SpeedChangeReason) {
        debug!(speed, %reason, "speed changed");
        self.emit(RampEvent::SpeedChanged { speed, reason });
    }

    pub fn phase_changed(&self, phase: Phase) {
        debug!(%phase, "phase changed");
        self.emit(RampEvent::PhaseChanged(phase));
    }

    pub fn max_reached(&self) {
        info!("max speed reached");
        self.emit(RampEvent::MaxReached);
    }

    pub fn strain_detected(&self, signal: StrainSignal) {
        info!(%signal, "strain detected");
        self.emit(RampEvent::StrainDetected(signal));
    }
}
