//! Sectioned variables-file format.
//!
//! The backing file is a sequence of sections, each holding `name = literal`
//! lines:
//!
//! ```text
//! [Variables]
//! count = 12
//! label = "bed mesh"
//!
//! [heat_bed]
//! speed = 100
//! ```
//!
//! Full-line `#` / `;` comments and blank lines are accepted on input and
//! never written on output. [`render`] is deterministic (sections and names
//! in lexicographic order), so two stores holding equal values produce
//! byte-identical files, and [`parse`]`(`[`render`]`(s)) == s` for every
//! sections value.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::literal::codec::{parse_literal, write_literal, LiteralError};
use crate::literal::value::Value;

/// Name-to-value bindings within one section.
pub type VariableMap = BTreeMap<String, Value>;

/// The full store shape: section name → variable bindings. The BTreeMap
/// ordering is the lexicographic write order.
pub type Sections = BTreeMap<String, VariableMap>;

/// The reserved default section for saves that do not target a macro.
pub const DEFAULT_SECTION: &str = "Variables";

/// Errors for a structurally malformed variables file. Line numbers are
/// 1-based.
#[derive(Debug, Error, PartialEq)]
pub enum VarfileError {
    /// A `name = value` line appeared before any section header.
    #[error("line {line}: variable entry appears before any [section] header")]
    EntryOutsideSection { line: usize },

    /// A header line that does not match `[name]`.
    #[error("line {line}: malformed section header")]
    MalformedHeader { line: usize },

    /// A non-comment line with no `=` separator.
    #[error("line {line}: expected 'name = value'")]
    MissingSeparator { line: usize },

    /// An entry whose name half is empty.
    #[error("line {line}: variable entry has an empty name")]
    EmptyName { line: usize },

    /// The same section header appeared twice.
    #[error("line {line}: duplicate section {name:?}")]
    DuplicateSection { name: String, line: usize },

    /// The same variable name appeared twice within one section.
    #[error("line {line}: duplicate variable {name:?} in section {section:?}")]
    DuplicateVariable {
        section: String,
        name: String,
        line: usize,
    },

    /// A value that is not a parsable literal.
    #[error("section {section:?}, variable {name:?}: {source}")]
    Literal {
        section: String,
        name: String,
        #[source]
        source: LiteralError,
    },
}

/// Parses the full text of a variables file.
///
/// Variable names and section names are case-sensitive and preserved as
/// written. Values are decoded through [`parse_literal`].
///
/// # Errors
///
/// Returns [`VarfileError`] on the first structural or literal failure;
/// a partially parsed result is never produced.
pub fn parse(text: &str) -> Result<Sections, VarfileError> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or(VarfileError::MalformedHeader { line: line_no })?;
            if sections.contains_key(name) {
                return Err(VarfileError::DuplicateSection {
                    name: name.to_string(),
                    line: line_no,
                });
            }
            sections.insert(name.to_string(), VariableMap::new());
            current = Some(name.to_string());
            continue;
        }

        let section = current
            .as_deref()
            .ok_or(VarfileError::EntryOutsideSection { line: line_no })?;
        let (name, value_text) = line
            .split_once('=')
            .ok_or(VarfileError::MissingSeparator { line: line_no })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(VarfileError::EmptyName { line: line_no });
        }

        let value = parse_literal(value_text.trim()).map_err(|source| VarfileError::Literal {
            section: section.to_string(),
            name: name.to_string(),
            source,
        })?;

        let variables = sections.entry(section.to_string()).or_default();
        if variables.contains_key(name) {
            return Err(VarfileError::DuplicateVariable {
                section: section.to_string(),
                name: name.to_string(),
                line: line_no,
            });
        }
        variables.insert(name.to_string(), value);
    }

    Ok(sections)
}

/// Renders `sections` in canonical form: lexicographic section order,
/// lexicographic name order within each section, one blank line after each
/// section, values in canonical literal text.
pub fn render(sections: &Sections) -> String {
    let mut out = String::new();
    for (section, variables) in sections {
        out.push('[');
        out.push_str(section);
        out.push_str("]\n");
        for (name, value) in variables {
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(&write_literal(value));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
