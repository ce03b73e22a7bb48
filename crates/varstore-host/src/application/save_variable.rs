//! The save operation: validate, resolve the target section, persist.
//!
//! Ordering is load-bearing. Validation (literal parse, alias resolution,
//! declared-variable check) happens before anything is mutated, so every
//! rejected save leaves the store, the file, and the macros exactly as
//! they were. Once validation passes, the live macro is updated first and
//! the file second; a write failure therefore leaves the macro ahead of
//! the file until the next successful save, which is the accepted risk for
//! a non-transactional store.

use thiserror::Error;
use tracing::info;

use varstore_core::{parse_literal, LiteralError, DEFAULT_SECTION};

use crate::application::binder::{apply_named_update, BindError};
use crate::infrastructure::macros::MacroRegistry;
use crate::infrastructure::storage::store::{StoreError, VariableStore};

/// Errors for the save operation.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The supplied value text is not a literal.
    #[error("unable to parse {value_text:?} as a literal: {source}")]
    UnparsableLiteral {
        value_text: String,
        #[source]
        source: LiteralError,
    },

    /// The alias-targeted update was rejected.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Writing or reloading the backing file failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Saves `name = value_text` to the store, optionally routed through the
/// macro whose alias is `alias`.
///
/// Without an alias the value lands in the default `Variables` section.
/// With an alias, the targeted macro's live variable is updated and the
/// value persists under that macro's registration name.
///
/// # Errors
///
/// [`SaveError::UnparsableLiteral`] and [`SaveError::Bind`] reject the
/// operation before any state changes. [`SaveError::Store`] means the
/// write (or the reload after it) failed; see [`VariableStore::persist`]
/// for what state survives that.
pub fn save_variable(
    store: &mut VariableStore,
    registry: &mut MacroRegistry,
    name: &str,
    value_text: &str,
    alias: Option<&str>,
) -> Result<(), SaveError> {
    let value = parse_literal(value_text).map_err(|source| SaveError::UnparsableLiteral {
        value_text: value_text.to_string(),
        source,
    })?;

    let section = match alias {
        Some(alias) => apply_named_update(registry, alias, name, &value)?,
        None => DEFAULT_SECTION.to_string(),
    };

    let snapshot = store.set(&section, name, value);
    store.persist(snapshot)?;
    info!(section = %section, name, "variable saved");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
