//! Line-oriented command console: the host's command dispatch surface.
//!
//! Commands are a single line of `KEY=value` parameters after the command
//! word, in the style of the control hosts this store serves:
//!
//! ```text
//! SAVE_VARIABLE VARIABLE=speed VALUE=100 MACRO=heat_bed
//! SAVE_VARIABLE VARIABLE=note VALUE="'pause at layer 12'"
//! STATUS
//! QUIT
//! ```
//!
//! Command words and parameter keys are case-insensitive; parameter values
//! are taken verbatim, and may be double-quoted to carry spaces. This
//! module only parses; dispatch lives with the caller that owns the store
//! and the registry.

use thiserror::Error;

/// Errors for command-line parsing.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    /// The command word is not recognised.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// A parameter word without the `KEY=value` shape.
    #[error("malformed parameter {0:?}: expected KEY=value")]
    MalformedParameter(String),

    /// A parameter key this command does not take.
    #[error("unexpected parameter {0:?}")]
    UnexpectedParameter(String),

    /// A parameter the command requires was absent.
    #[error("missing required parameter {0}")]
    MissingParameter(&'static str),

    /// A double quote was opened but never closed.
    #[error("unterminated quoted string in command")]
    UnterminatedQuote,
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `SAVE_VARIABLE VARIABLE=<name> VALUE=<literal> [MACRO=<alias>]`
    SaveVariable {
        variable: String,
        value: String,
        macro_alias: Option<String>,
    },
    /// `STATUS`: print the polling snapshot.
    Status,
    /// `QUIT` / `EXIT`: end the session.
    Quit,
}

/// Parses one console line. Blank lines and `#`/`;` comment lines parse to
/// `None`.
///
/// # Errors
///
/// Returns [`CommandError`] describing what the line got wrong; the caller
/// reports it and keeps the console alive.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
        return Ok(None);
    }

    let words = split_words(trimmed)?;
    let Some((head, params)) = words.split_first() else {
        return Ok(None);
    };

    match head.to_ascii_uppercase().as_str() {
        "SAVE_VARIABLE" => {
            let mut variable = None;
            let mut value = None;
            let mut macro_alias = None;
            for param in params {
                let (key, val) = param
                    .split_once('=')
                    .ok_or_else(|| CommandError::MalformedParameter(param.clone()))?;
                match key.to_ascii_uppercase().as_str() {
                    "VARIABLE" => variable = Some(val.to_string()),
                    "VALUE" => value = Some(val.to_string()),
                    "MACRO" => macro_alias = Some(val.to_string()),
                    _ => return Err(CommandError::UnexpectedParameter(key.to_string())),
                }
            }
            Ok(Some(Command::SaveVariable {
                variable: variable.ok_or(CommandError::MissingParameter("VARIABLE"))?,
                value: value.ok_or(CommandError::MissingParameter("VALUE"))?,
                macro_alias,
            }))
        }
        "STATUS" => match params {
            [] => Ok(Some(Command::Status)),
            [extra, ..] => Err(CommandError::UnexpectedParameter(extra.clone())),
        },
        "QUIT" | "EXIT" => Ok(Some(Command::Quit)),
        _ => Err(CommandError::UnknownCommand(head.clone())),
    }
}

/// Splits a line into words, honouring double quotes. The quotes
/// themselves are dropped; `VALUE="'a b'"` becomes one word `VALUE='a b'`.
fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                // An explicit empty quoted word still counts as a word.
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_quotes {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
