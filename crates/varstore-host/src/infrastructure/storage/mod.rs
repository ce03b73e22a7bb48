//! Storage infrastructure: variables-file and configuration persistence.
//!
//! Two file-system adapters live here:
//!
//! - **`store`** – The persistent variable store itself. It owns the
//!   backing variables file and is the only code in the host that reads or
//!   writes it.
//! - **`config`** – The host's own TOML configuration: where the variables
//!   file lives, the log level, and the macro declarations.
//!
//! Keeping storage concerns here, rather than scattered throughout the
//! application, means the file formats can change without touching any
//! other part of the codebase.

pub mod config;
pub mod store;
