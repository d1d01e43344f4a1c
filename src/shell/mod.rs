//! Line-oriented command shell for `memsniffer`.

pub mod command;
pub mod session;

pub use command::{Command, CommandError};
pub use session::{Flow, Session, ShellError};
