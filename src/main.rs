use std::io;
use std::process;

use clap::Parser;
use memsniffer::core::mem::MemoryRegionPerms;
use memsniffer::core::proc::resolve_target;
use memsniffer::core::scan::{ScanOptions, parse_address};
use memsniffer::logging::{LogFormat, LogLevel, init_logging};
use memsniffer::shell::Session;
use tracing::{error, info};

/// Find and patch values in the memory of a running process.
#[derive(Parser, Debug)]
#[command(name = "memsniffer", version)]
struct Cli {
    /// Process id or process name
    target: String,

    /// Only scan memory at or above this address (hex)
    #[arg(long, value_parser = parse_address)]
    start: Option<u64>,

    /// Only scan memory at or below this address (hex)
    #[arg(long, value_parser = parse_address)]
    end: Option<u64>,

    /// Also scan regions that are readable but not writable
    #[arg(long, default_value_t = false)]
    read_only: bool,

    /// Keep matches at every byte offset, not only those aligned to the value size
    #[arg(long, default_value_t = false)]
    unaligned: bool,

    #[arg(long, default_value = "warn")]
    log_level: LogLevel,

    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

impl Cli {
    fn scan_options(&self) -> ScanOptions {
        let mut perms = vec![MemoryRegionPerms::Write];
        if self.read_only {
            perms.push(MemoryRegionPerms::Read);
        }

        ScanOptions {
            start_address: self.start,
            end_address: self.end,
            perms,
            aligned: !self.unaligned,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level, cli.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    let options = cli.scan_options();
    if let Err(e) = options.validate() {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let pid = match resolve_target(&cli.target) {
        Ok(pid) => pid,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    info!(pid, target = %cli.target, "attaching");

    let mut session = Session::new(pid, options);
    if let Err(e) = session.run(io::stdin().lock(), io::stdout().lock()) {
        error!("{e}");
        process::exit(1);
    }
}
