//! Navigation scripts: comma-separated commands replayed against a deck.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Errors from parsing a navigation script.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// The command word is not recognised.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command needs an argument after `:`.
    #[error("command {0} requires an argument")]
    MissingArgument(String),

    /// `key:` was given something other than a key code.
    #[error("invalid key code: {0}")]
    InvalidKeyCode(String),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "argument", rename_all = "snake_case")]
pub enum Command {
    /// Go to the next step.
    Next,
    /// Go to the previous step.
    Prev,
    /// Select a step by id or `#id`.
    Select(String),
    /// Same as select, through the `goTo` alias.
    GoTo(String),
    /// Press a key, given as a legacy key code.
    Key(u32),
    /// Report an external location hash change.
    Hash(String),
    /// Invoke an operation by name with an optional argument.
    Op {
        /// Operation name.
        name: String,
        /// Operation argument.
        argument: Option<String>,
    },
}

impl FromStr for Command {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (word, argument) = match s.split_once(':') {
            Some((word, argument)) => (word, Some(argument)),
            None => (s, None),
        };
        let required = || {
            argument
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ScriptError::MissingArgument(word.to_string()))
        };

        match word {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "select" => Ok(Self::Select(required()?)),
            "goto" => Ok(Self::GoTo(required()?)),
            "key" => {
                let code = required()?;
                code.parse()
                    .map(Self::Key)
                    .map_err(|_| ScriptError::InvalidKeyCode(code))
            }
            // the fragment may legitimately be empty
            "hash" => Ok(Self::Hash(argument.unwrap_or_default().to_string())),
            "op" => {
                let spec = required()?;
                let (name, argument) = match spec.split_once(':') {
                    Some((name, argument)) => (name.to_string(), Some(argument.to_string())),
                    None => (spec, None),
                };
                Ok(Self::Op { name, argument })
            }
            other => Err(ScriptError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Prev => f.write_str("prev"),
            Self::Select(id) => write!(f, "select:{id}"),
            Self::GoTo(id) => write!(f, "goto:{id}"),
            Self::Key(code) => write!(f, "key:{code}"),
            Self::Hash(hash) => write!(f, "hash:{hash}"),
            Self::Op {
                name,
                argument: Some(argument),
            } => write!(f, "op:{name}:{argument}"),
            Self::Op {
                name,
                argument: None,
            } => write!(f, "op:{name}"),
        }
    }
}

/// Parse a comma-separated script. Blank entries are skipped.
///
/// # Errors
///
/// Returns the first command that fails to parse.
pub fn parse_script(script: &str) -> Result<Vec<Command>, ScriptError> {
    script
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}
