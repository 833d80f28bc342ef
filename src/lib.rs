// Library surface for the binary and the integration tests.
// The speed-control engine (timing, strain, ramp, controller) does no I/O;
// document loading, settings and the terminal runtime sit around it.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod events;
pub mod ramp;
pub mod reader;
pub mod runtime;
pub mod session;
pub mod strain;
pub mod time_series;
pub mod timing;
pub mod util;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::SpeedControl;
pub use error::{Error, Result};
pub use events::{Notifier, RampEvent, SpeedChangeReason};
pub use ramp::{Mode, ModeConfig, Phase, SpeedController};
pub use reader::Reader;
pub use timing::{Scheduler, SchedulerEvent, TimingConfig};
