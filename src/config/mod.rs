//! Configuration constants
//!
//! Built-in defaults used when the build manifest omits a value, and the
//! upstream locations of pinned dependencies.

pub mod defaults;
pub mod urls;
