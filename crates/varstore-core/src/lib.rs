//! # varstore-core
//!
//! Shared library for the varstored host containing the literal value model,
//! the literal codec, and the sectioned variables-file format.
//!
//! This crate is pure: it has zero dependencies on the OS, the file system,
//! or the clock. Everything in it is deterministic and unit-testable, which
//! is why the file-format round-trip guarantees live here rather than in the
//! host application.
//!
//! # Architecture overview
//!
//! The varstored host keeps a small set of named, typed values alive across
//! process restarts. Values are grouped into named *sections*; one reserved
//! section, `Variables`, is the default namespace, and every other section
//! is aligned with a macro's registration name so that stored values can be
//! overlaid onto the macro's live variables at startup.
//!
//! This crate defines:
//!
//! - **`literal`** – The [`Value`] model and its text codec. Values are
//!   restricted to closed-form constants (numbers, strings, booleans,
//!   `None`, and sequences/mappings of the same); the parser rejects
//!   anything that would require evaluation, so a saved value can never
//!   smuggle in an expression.
//!
//! - **`varfile`** – The on-disk shape: `[Section]` headers followed by
//!   `name = literal` lines. Parsing decodes every value through the
//!   literal codec; rendering is deterministic so saved files diff cleanly.

pub mod literal;
pub mod varfile;

// Re-export the most-used items at the crate root so callers can write
// `varstore_core::Value` instead of `varstore_core::literal::value::Value`.
pub use literal::codec::{parse_literal, write_literal, LiteralError};
pub use literal::value::Value;
pub use varfile::{Sections, VarfileError, VariableMap, DEFAULT_SECTION};
