//! Bundle pipeline descriptor.
//!
//! The descriptor is a pure data declaration: an ordered list of build
//! targets, each with an entry module, an output specification, and an
//! ordered sequence of transform stages. It performs no I/O and never
//! fails; validity checking belongs to the build runner that consumes it.

pub mod output;
pub mod stage;
pub mod target;

pub use output::*;
pub use stage::*;
pub use target::*;
