//! The `scan-target` probe: one `u32` cell, echoed back forever.

pub mod args;
pub mod cell;
pub mod parse;
pub mod repl;

use std::io::{BufRead, Write};

use tracing::debug;

pub use args::{Invocation, usage};
pub use cell::Cell;
pub use repl::{Repl, TargetError};

/// Runs the whole program for one invocation. Returns once input is closed.
pub fn run<R: BufRead, W: Write>(
    invocation: Invocation,
    pid: u32,
    input: R,
    mut output: W,
) -> Result<(), TargetError> {
    let initial = match invocation {
        Invocation::Usage { program } => {
            writeln!(output, "{}", usage(&program))?;
            output.flush()?;
            return Ok(());
        }
        Invocation::Run { initial } => initial,
    };

    writeln!(output, "Process ID: {pid}")?;

    let mut cell = Cell::new(0);
    cell.store(initial);
    debug!(pid, address = %format!("{:#x}", cell.address()), "cell allocated");

    Repl::new(input, output, cell).run()
}
