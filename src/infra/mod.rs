//! Infrastructure layer
//!
//! Handles all I/O with the outside world: filesystem helpers, child
//! processes, and the version-control clients.

pub mod filesystem;
pub mod git;
pub mod process;
pub mod svn;
pub mod toolchain;
