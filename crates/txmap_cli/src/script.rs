//! Script parsing.
//!
//! One command per line: `<ctx> <verb> [args]`. Blank lines and lines
//! starting with `#` are skipped.

use thiserror::Error;
use txmap_core::{ContextId, CoreError};

/// Errors raised while parsing or running a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A command failed against the map.
    #[error("line {line}: {source}")]
    Core {
        /// 1-based line number.
        line: usize,
        /// The map error.
        #[source]
        source: CoreError,
    },
}

impl ScriptError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// A parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `begin`
    Begin,
    /// `commit`
    Commit,
    /// `rollback`
    Rollback,
    /// `put <key> <value>`
    Put(String, String),
    /// `get <key>`
    Get(String),
    /// `remove <key>`
    Remove(String),
    /// `size`
    Size,
}

/// A command tagged with its context and source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    /// Issuing context.
    pub context: ContextId,
    /// The command.
    pub command: Command,
}

/// Parses a whole script.
pub fn parse(source: &str) -> Result<Vec<Line>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, text)| {
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                None
            } else {
                Some(parse_line(idx + 1, text))
            }
        })
        .collect()
}

fn parse_line(number: usize, text: &str) -> Result<Line, ScriptError> {
    let mut words = text.split_whitespace();

    let context = words
        .next()
        .and_then(|word| word.parse::<u64>().ok())
        .map(ContextId::new)
        .ok_or_else(|| ScriptError::parse(number, "expected a context number"))?;
    let verb = words
        .next()
        .ok_or_else(|| ScriptError::parse(number, "expected a command"))?;
    let args: Vec<&str> = words.collect();

    let arg = |idx: usize| args[idx].to_string();
    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(ScriptError::parse(
                number,
                format!("`{verb}` takes {expected} argument(s), got {}", args.len()),
            ))
        }
    };

    let command = match verb {
        "begin" => arity(0).map(|()| Command::Begin),
        "commit" => arity(0).map(|()| Command::Commit),
        "rollback" => arity(0).map(|()| Command::Rollback),
        "size" => arity(0).map(|()| Command::Size),
        "get" => arity(1).map(|()| Command::Get(arg(0))),
        "remove" => arity(1).map(|()| Command::Remove(arg(0))),
        "put" => arity(2).map(|()| Command::Put(arg(0), arg(1))),
        other => Err(ScriptError::parse(
            number,
            format!("unknown command `{other}`"),
        )),
    }?;

    Ok(Line {
        number,
        context,
        command,
    })
}
