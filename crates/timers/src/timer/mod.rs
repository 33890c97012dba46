//! Timers
//!
//! A timer binds a [`crate::state::StateNamespace`], a due
//! [`crate::time::Timestamp`] and a [`crate::time::TimeDomain`]. This module
//! provides the value type and its two comparisons ([`data`]), its binary
//! codec ([`coder`]), and an in-memory per-key timer set ([`internals`]).
//!
//! # Example
//!
//! ```rust
//! use stream_timers::coder::Coder;
//! use stream_timers::state::StateNamespace;
//! use stream_timers::time::{TimeDomain, Timestamp};
//! use stream_timers::timer::{TimerData, TimerDataCoder};
//! use stream_timers::window::{IntervalWindow, IntervalWindowCoder};
//!
//! let window = IntervalWindow::new(Timestamp::from_millis(0), Timestamp::from_millis(100))?;
//! let namespace = StateNamespace::window(&IntervalWindowCoder, &window)?;
//! let timer = TimerData::of(namespace, Timestamp::from_millis(99), TimeDomain::EventTime);
//!
//! let coder = TimerDataCoder::of(IntervalWindowCoder);
//! let bytes = coder.encode_to_vec(&timer)?;
//! assert_eq!(coder.decode_from_slice(&bytes)?, timer);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod coder;
pub mod data;
pub mod internals;

pub use coder::{TimerDataCoder, MIN_ENCODED_LEN};
pub use data::{by_timestamp, TimerData};
pub use internals::{InMemoryTimerInternals, TimerInternals};
