//! Prelude for crashkit-timing.
//!
//! Re-exports the types most callers need.

pub use crate::alarm::AlarmTimer;
pub use crate::clock::{Clock, MonotonicClock, SharedClock, TickSource, VirtualClock};
pub use crate::error::{TimingError, TimingResult};
pub use crate::ledger::TimerLedger;
pub use crate::timeout::Timeout;
