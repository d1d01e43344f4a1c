use crate::core::scan::{ScanError, parse_address};
use crate::core::value::ValueType;

pub const HELP: &[&str] = &[
    "new <type> <value>             start a new scan",
    "next <value>                   keep results now holding <value>",
    "look <type> <address>          read one address",
    "lookall <type>                 read every result",
    "update <type> <address> <value> write one address",
    "show                           list results",
    "regions                        list scanned memory regions",
    "exit                           leave",
    "types: int8 int16 int32 int64 uint8 uint16 uint32 uint64 float32 double64",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("{command}: missing <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{command}: unexpected argument '{argument}'")]
    UnexpectedArgument {
        command: &'static str,
        argument: String,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New { value_type: ValueType, value: String },
    Next { value: String },
    Look { value_type: ValueType, address: u64 },
    LookAll { value_type: ValueType },
    Update { value_type: ValueType, address: u64, value: String },
    Show,
    Regions,
    Help,
    Exit,
}

struct Args<'a> {
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.words.next().ok_or(CommandError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn value_type(&mut self) -> Result<ValueType, CommandError> {
        Ok(self.next("type")?.parse()?)
    }

    fn address(&mut self) -> Result<u64, CommandError> {
        Ok(parse_address(self.next("address")?)?)
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.words.next() {
            None => Ok(()),
            Some(extra) => Err(CommandError::UnexpectedArgument {
                command: self.command,
                argument: extra.to_owned(),
            }),
        }
    }
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };

        let name = name.to_lowercase();
        let command: &'static str = match name.as_str() {
            "new" => "new",
            "next" => "next",
            "look" => "look",
            "lookall" => "lookall",
            "update" => "update",
            "show" => "show",
            "regions" => "regions",
            "help" | "?" => "help",
            "exit" | "quit" => "exit",
            other => return Err(CommandError::Unknown(other.to_owned())),
        };
        let mut args = Args { command, words };

        let cmd = match command {
            "new" => Command::New {
                value_type: args.value_type()?,
                value: args.next("value")?.to_owned(),
            },
            "next" => Command::Next {
                value: args.next("value")?.to_owned(),
            },
            "look" => Command::Look {
                value_type: args.value_type()?,
                address: args.address()?,
            },
            "lookall" => Command::LookAll {
                value_type: args.value_type()?,
            },
            "update" => Command::Update {
                value_type: args.value_type()?,
                address: args.address()?,
                value: args.next("value")?.to_owned(),
            },
            "show" => Command::Show,
            "regions" => Command::Regions,
            "help" => Command::Help,
            _ => Command::Exit,
        };
        args.finish()?;

        Ok(Some(cmd))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("   \t"), Ok(None));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("new uint32 31337"),
            Ok(Some(Command::New {
                value_type: ValueType::U32,
                value: "31337".to_owned()
            }))
        );
        assert_eq!(
            Command::parse("NEXT 5"),
            Ok(Some(Command::Next {
                value: "5".to_owned()
            }))
        );
        assert_eq!(
            Command::parse("look int8 0x7ffd1000"),
            Ok(Some(Command::Look {
                value_type: ValueType::I8,
                address: 0x7ffd1000
            }))
        );
        assert_eq!(
            Command::parse("update double64 7ffd1000 1.5"),
            Ok(Some(Command::Update {
                value_type: ValueType::F64,
                address: 0x7ffd1000,
                value: "1.5".to_owned()
            }))
        );
        assert_eq!(
            Command::parse("lookall u16"),
            Ok(Some(Command::LookAll {
                value_type: ValueType::U16
            }))
        );
        assert_eq!(Command::parse("quit"), Ok(Some(Command::Exit)));
        assert_eq!(Command::parse("show"), Ok(Some(Command::Show)));
        assert_eq!(Command::parse("regions"), Ok(Some(Command::Regions)));
        assert_eq!(Command::parse("?"), Ok(Some(Command::Help)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("jump 1"),
            Err(CommandError::Unknown("jump".to_owned()))
        );
        assert_eq!(
            Command::parse("new uint32"),
            Err(CommandError::MissingArgument {
                command: "new",
                argument: "value"
            })
        );
        assert_eq!(
            Command::parse("new string abc"),
            Err(CommandError::Scan(ScanError::UnknownType("string".to_owned())))
        );
        assert_eq!(
            Command::parse("look u32 0xgg"),
            Err(CommandError::Scan(ScanError::InvalidAddress(
                "0xgg".to_owned()
            )))
        );
        assert_eq!(
            Command::parse("show all"),
            Err(CommandError::UnexpectedArgument {
                command: "show",
                argument: "all".to_owned()
            })
        );
    }

    #[test]
    fn test_error_message() {
        let err = Command::parse("update u8 10").unwrap_err();
        assert_eq!(err.to_string(), "update: missing <value>");
    }
}
