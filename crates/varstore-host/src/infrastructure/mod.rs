//! Infrastructure layer for the varstored host.
//!
//! Contains the outward-facing adapters: file-system storage for the
//! variables file and host configuration, the macro registry backing the
//! binder, and the line-oriented command console.

pub mod console;
pub mod macros;
pub mod storage;
