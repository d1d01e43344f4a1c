use std::io::{self, BufRead, Write};

use tracing::{debug, trace};

use super::cell::Cell;
use super::parse::parse_leading_u32;

pub const PROMPT: &str = "Enter a new number: ";

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// End of input reached.
    Closed,
}

/// Prompt, read one line, store it, repeat.
///
/// Input is taken strictly one `\n`-terminated line at a time; an unterminated last line still
/// counts. Invalid UTF-8 is replaced lossily, so no input can stop the loop. Only end of input
/// or an I/O error ends [`Repl::run`].
pub struct Repl<R, W> {
    input: R,
    output: W,
    cell: Cell,
    line: Vec<u8>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W, cell: Cell) -> Self {
        Repl {
            input,
            output,
            cell,
            line: Vec::with_capacity(64),
        }
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn prompt(&mut self) -> Result<(), TargetError> {
        writeln!(self.output, "Number is {}", self.cell.get())?;
        write!(self.output, "{PROMPT}")?;
        self.output.flush()?;
        Ok(())
    }

    pub fn process(&mut self, line: &str) {
        let parsed = parse_leading_u32(line.trim());
        if parsed.is_none() {
            debug!(input = line.trim(), "not a number, storing fallback");
        }
        self.cell.store(parsed);
        trace!(value = self.cell.get(), "cell updated");
    }

    fn read_line(&mut self) -> Result<Option<String>, TargetError> {
        self.line.clear();
        if self.input.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&self.line).into_owned()))
    }

    pub fn step(&mut self) -> Result<Step, TargetError> {
        self.prompt()?;
        match self.read_line()? {
            None => Ok(Step::Closed),
            Some(line) => {
                self.process(&line);
                Ok(Step::Continue)
            }
        }
    }

    pub fn run(&mut self) -> Result<(), TargetError> {
        while self.step()? == Step::Continue {}
        debug!("input closed");
        Ok(())
    }
}
