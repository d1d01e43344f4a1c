//! Memory probing tools.
//!
//! Two programs share this library:
//! - `scan-target`, a tiny process holding one `u32` cell that echoes every number it is given,
//!   so an external memory editor has something stable to find.
//! - `memsniffer`, a line-oriented memory scanner that locates, narrows down, reads and
//!   writes values inside another process.

pub mod core;
pub mod logging;
pub mod shell;
pub mod target;
