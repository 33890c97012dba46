//! Window values and their coders
//!
//! Timers are scoped to windows through [`crate::state::StateNamespace`].
//! This module supplies the two standard window shapes and the coders that
//! put them on the wire:
//!
//! ```text
//! Time:       0----------100---------200
//! Interval:   [    w1    )[    w2    )
//! Global:     [--------------------------------->
//! ```
//!
//! Custom window types plug in by implementing [`BoundedWindow`] and
//! providing a [`crate::coder::Coder`] for them. Assigning elements to
//! windows and merging windows happen elsewhere.

pub mod coder;
pub mod types;

pub use coder::{GlobalWindowCoder, IntervalWindowCoder};
pub use types::{BoundedWindow, GlobalWindow, IntervalWindow};
