//! Timers for windowed stream processing
//!
//! This crate defines how deferred callbacks ("timers") are represented,
//! ordered and serialized:
//!
//! - [`state`]: namespaces binding a timer to the global scope or a window
//! - [`timer`]: the [`TimerData`] value, its timestamp-only due order, its
//!   binary codec, and an in-memory per-key timer set
//! - [`coder`] and [`window`]: the pluggable codec trait and the standard
//!   window types it is used with
//!
//! Deciding when watermarks advance, assigning and merging windows, storing
//! state and evaluating triggers are left to the surrounding engine.

pub mod coder;
pub mod config;
pub mod error;
pub mod state;
pub mod time;
pub mod timer;
pub mod window;

// Re-export commonly used types
pub use coder::{Coder, VecCoder};

pub use config::{CodecConfig, TimerConfig};

pub use error::{
    DecodeResult, DecodingError, EncodeResult, EncodingError, Result as TimerResult, TimerError,
    WindowError,
};

pub use state::{StateNamespace, WindowNamespace};

pub use time::{TimeDomain, Timestamp};

pub use timer::{by_timestamp, InMemoryTimerInternals, TimerData, TimerDataCoder, TimerInternals};

pub use window::{BoundedWindow, GlobalWindow, GlobalWindowCoder, IntervalWindow, IntervalWindowCoder};
