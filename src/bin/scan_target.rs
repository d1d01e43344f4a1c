use std::io;
use std::process;

use memsniffer::logging::{LogLevel, init_logging_fixed};
use memsniffer::target::{self, Invocation};
use tracing::error;

fn main() {
    if let Err(e) = init_logging_fixed(LogLevel::Warn) {
        eprintln!("{e}");
    }

    let invocation =
        Invocation::from_args(std::env::args_os().map(|a| a.to_string_lossy().into_owned()));
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    if let Err(e) = target::run(invocation, process::id(), stdin, stdout) {
        error!("{e}");
        process::exit(1);
    }
}
