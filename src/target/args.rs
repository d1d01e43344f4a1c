use std::path::Path;

use super::parse::parse_leading_u32;

pub const DEFAULT_PROGRAM_NAME: &str = "scan-target";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Wrong argument count; print the usage line and exit successfully.
    Usage { program: String },
    /// Start the loop with this initial cell content (`None` when the argument is not a number).
    Run { initial: Option<u32> },
}

impl Invocation {
    /// Expects the full argv, program path included.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let program = program_name(args.next().as_deref());
        let rest: Vec<String> = args.collect();

        match rest.as_slice() {
            [number] => Invocation::Run {
                initial: parse_leading_u32(number),
            },
            _ => Invocation::Usage { program },
        }
    }
}

pub fn usage(program: &str) -> String {
    format!("usage: {program} <number>")
}

fn program_name(argv0: Option<&str>) -> String {
    argv0
        .and_then(|p| Path::new(p).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_PROGRAM_NAME)
        .to_owned()
}
