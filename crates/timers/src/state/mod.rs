//! State addressing
//!
//! State and timers are partitioned per key and then per [`StateNamespace`]:
//!
//! ```text
//! key "user-42"
//!   ├── "/"                  global scope
//!   ├── "/<window [0,100)>/"  window scope
//!   └── "/<window [100,200)>/"
//! ```
//!
//! The string key of a namespace is stable across processes and releases,
//! so state backends can use it directly. Storing the state itself is the
//! backend's concern.

pub mod namespace;

pub use namespace::{StateNamespace, WindowNamespace};
