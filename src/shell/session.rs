use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use super::command::{Command, CommandError, HELP};
use crate::core::scan::{Scan, ScanError, ScanOptions, read_value, write_value};

pub const PROMPT: &str = "[memsniffer]>_ ";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("no active scan, start one with 'new <type> <value>'")]
    NoActiveScan,
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Command session against one process.
pub struct Session {
    pid: u32,
    options: ScanOptions,
    scan: Option<Scan>,
}

impl Session {
    pub fn new(pid: u32, options: ScanOptions) -> Self {
        Session {
            pid,
            options,
            scan: None,
        }
    }

    pub fn scan(&self) -> Option<&Scan> {
        self.scan.as_ref()
    }

    fn active_scan(&mut self) -> Result<&mut Scan, ShellError> {
        self.scan.as_mut().ok_or(ShellError::NoActiveScan)
    }

    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<Flow, ShellError> {
        debug!(?cmd, "executing");
        match cmd {
            Command::New { value_type, value } => {
                writeln!(out, "Looking for new {value_type} value: {value}")?;
                let mut scan = Scan::new(self.pid, value_type, self.options.clone())?;
                scan.set_value_from_str(&value)?;
                let found = scan.init()?.len();
                self.scan = Some(scan);
                writeln!(out, "Found {found} matches")?;
            }
            Command::Next { value } => {
                let scan = self.active_scan()?;
                scan.set_value_from_str(&value)?;
                writeln!(out, "Looking for next value: {value}")?;
                for result in scan.next_scan()? {
                    writeln!(out, "Found {result} at 0x{:x}", result.address)?;
                }
            }
            Command::Look {
                value_type,
                address,
            } => {
                let result = read_value(self.pid, address, value_type)?;
                writeln!(
                    out,
                    "Value at 0x{address:x}: {result} ({})",
                    result.hex()
                )?;
            }
            Command::LookAll { value_type } => {
                let pid = self.pid;
                let addresses: Vec<u64> = self
                    .active_scan()?
                    .results
                    .iter()
                    .map(|r| r.address)
                    .collect();
                for address in addresses {
                    match read_value(pid, address, value_type) {
                        Ok(result) => writeln!(
                            out,
                            "Value at 0x{address:x}: {result} ({})",
                            result.hex()
                        )?,
                        Err(e) => writeln!(out, "Value at 0x{address:x}: error: {e}")?,
                    }
                }
            }
            Command::Update {
                value_type,
                address,
                value,
            } => {
                let written = write_value(self.pid, address, value_type, &value)?;
                writeln!(out, "Set new value {written} at 0x{address:x}")?;
            }
            Command::Show => {
                let scan = self.active_scan()?;
                scan.refresh()?;
                for result in &scan.results {
                    writeln!(out, "Found {result} at 0x{:x}", result.address)?;
                }
            }
            Command::Regions => {
                let regions = match &self.scan {
                    Some(scan) => scan.regions().to_vec(),
                    None => self.options.regions(self.pid)?,
                };
                writeln!(out, "Found regions: {}", regions.len())?;
                for region in &regions {
                    writeln!(out, "{}", region.describe())?;
                }
            }
            Command::Help => {
                for line in HELP {
                    writeln!(out, "{line}")?;
                }
            }
            Command::Exit => {
                writeln!(out, "Exiting...")?;
                return Ok(Flow::Exit);
            }
        }

        Ok(Flow::Continue)
    }

    /// Parses and executes one input line. Command failures are printed, not returned.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, ShellError> {
        let result = match Command::parse(line) {
            Ok(None) => Ok(Flow::Continue),
            Ok(Some(cmd)) => self.execute(cmd, out),
            Err(e) => Err(e.into()),
        };

        match result {
            Err(ShellError::Io(e)) => Err(ShellError::Io(e)),
            Err(e) => {
                warn!("{e}");
                writeln!(out, "error: {e}")?;
                Ok(Flow::Continue)
            }
            Ok(flow) => Ok(flow),
        }
    }

    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
    ) -> Result<(), ShellError> {
        info!(pid = self.pid, "session started");
        let mut line = Vec::new();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            let text = String::from_utf8_lossy(&line);
            if self.handle_line(&text, &mut out)? == Flow::Exit {
                break;
            }
        }

        info!(pid = self.pid, "session ended");
        Ok(())
    }
}
