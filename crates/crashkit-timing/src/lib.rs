//! # crashkit-timing
//!
//! Timing primitives behind the `crashkit` watchdog: a wraparound-safe
//! monotonic clock, a named timer ledger and a single-deadline alarm timer.
//!
//! ## Architecture
//!
//! - [`clock`] - [`Clock`] trait, [`MonotonicClock`] over a wrapping 32-bit
//!   [`TickSource`], and [`VirtualClock`] for tests
//! - [`timeout`] - [`Timeout`], a millisecond offset with an `Infinite` sentinel
//! - [`ledger`] - [`TimerLedger`], named absolute expiries with O(log n) next-due lookup
//! - [`alarm`] - [`AlarmTimer`], one re-armable wakeup, manually polled or thread driven
//! - [`error`] - [`TimingError`]
//!
//! ## Example
//!
//! ```rust
//! use crashkit_timing::prelude::*;
//!
//! # fn main() -> TimingResult<()> {
//! let clock = VirtualClock::shared(0);
//! let mut ledger = TimerLedger::new(clock.clone());
//!
//! ledger.add("worker", Timeout::Millis(100))?;
//! assert_eq!(ledger.next_expiry_offset(), Timeout::Millis(100));
//!
//! clock.advance(100);
//! assert_eq!(ledger.expunge_expired(), vec!["worker".to_string()]);
//! assert!(ledger.contains("worker"));
//! # Ok(())
//! # }
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod alarm;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod timeout;

pub mod prelude;

pub use alarm::AlarmTimer;
pub use clock::{
    Clock, ManualTickSource, MonotonicClock, SharedClock, SystemTickSource, TickSource,
    VirtualClock,
};
pub use error::{TimingError, TimingResult};
pub use ledger::TimerLedger;
pub use timeout::Timeout;
