//! Reconciles stored sections with live macro variable namespaces.
//!
//! Two directions of flow:
//!
//! - At startup, [`bind_on_load`] overlays each stored section onto the
//!   macro registered under the same name, so values saved in a previous
//!   run reappear in the macro's live namespace.
//! - During a targeted save, [`apply_named_update`] pushes the new value
//!   into the live macro first and answers which section the store should
//!   persist it under.

use thiserror::Error;
use tracing::{debug, info};

use varstore_core::{Sections, Value};

use crate::infrastructure::macros::MacroRegistry;

/// Errors for alias-targeted macro updates.
#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    /// No registered macro carries the requested alias.
    #[error("unknown macro alias {0:?}")]
    UnknownMacroAlias(String),

    /// The macro exists but does not declare the requested variable. A
    /// save may only update a declared variable, never introduce one.
    #[error("macro {macro_name:?} does not declare variable {variable:?}")]
    UnknownVariable {
        macro_name: String,
        variable: String,
    },
}

/// Overlays stored sections onto the live variables of matching macros.
///
/// A macro matches when a store section's name equals its registration
/// name. Stored values win on conflicting names; variables the macro
/// declares that are absent from the store are left untouched. Macros and
/// sections with no counterpart are ignored.
pub fn bind_on_load(sections: &Sections, registry: &mut MacroRegistry) {
    for entry in registry.iter_mut() {
        let Some(stored) = sections.get(entry.name()) else {
            continue;
        };
        let mut variables = entry.variables();
        for (name, value) in stored {
            variables.insert(name.clone(), value.clone());
        }
        entry.set_variables(variables);
        debug!(
            macro_name = entry.name(),
            restored = stored.len(),
            "stored variables overlaid onto macro"
        );
    }
}

/// Sets `variable` on the macro whose alias is `alias` and returns that
/// macro's registration name, i.e. the section the value persists under.
///
/// Macros are scanned in registration order and the first alias match is
/// taken.
///
/// # Errors
///
/// [`BindError::UnknownMacroAlias`] when no macro carries the alias;
/// [`BindError::UnknownVariable`] when the macro does not already declare
/// `variable`. In both cases no macro is modified.
pub fn apply_named_update(
    registry: &mut MacroRegistry,
    alias: &str,
    variable: &str,
    value: &Value,
) -> Result<String, BindError> {
    for entry in registry.iter_mut() {
        if entry.alias() != Some(alias) {
            continue;
        }
        let mut variables = entry.variables();
        if !variables.contains_key(variable) {
            return Err(BindError::UnknownVariable {
                macro_name: entry.name().to_string(),
                variable: variable.to_string(),
            });
        }
        variables.insert(variable.to_string(), value.clone());
        entry.set_variables(variables);
        info!(
            macro_name = entry.name(),
            alias, variable, "live macro variable updated"
        );
        return Ok(entry.name().to_string());
    }
    Err(BindError::UnknownMacroAlias(alias.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::macros::mock::MockMacro;
    use varstore_core::VariableMap;

    fn vars(entries: &[(&str, Value)]) -> VariableMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn sections(entries: &[(&str, &[(&str, Value)])]) -> Sections {
        entries
            .iter()
            .map(|(name, vars_)| (name.to_string(), vars(vars_)))
            .collect()
    }

    // ── bind_on_load ──────────────────────────────────────────────────────────

    #[test]
    fn test_bind_on_load_overlays_matching_section() {
        // Arrange: macro declares speed=0, retract=1; store has speed=100.
        let mut registry = MacroRegistry::new();
        let mock = MockMacro::new(
            Some("bed"),
            vars(&[("speed", Value::Int(0)), ("retract", Value::Int(1))]),
        );
        registry.register("heat_bed", Box::new(mock));
        let stored = sections(&[("heat_bed", &[("speed", Value::Int(100))])]);

        // Act
        bind_on_load(&stored, &mut registry);

        // Assert: stored value wins; undeclared-in-store variable untouched.
        let live = registry.get("heat_bed").unwrap().variables();
        assert_eq!(live["speed"], Value::Int(100));
        assert_eq!(live["retract"], Value::Int(1));
    }

    #[test]
    fn test_bind_on_load_can_introduce_stored_only_variables() {
        // The startup overlay is a merge, not an update: a stored name the
        // macro never declared still lands in the live namespace.
        let mut registry = MacroRegistry::new();
        registry.register("m", Box::new(MockMacro::new(None, VariableMap::new())));
        let stored = sections(&[("m", &[("late_addition", Value::Bool(true))])]);

        bind_on_load(&stored, &mut registry);

        assert_eq!(
            registry.get("m").unwrap().variables()["late_addition"],
            Value::Bool(true)
        );
    }

    #[test]
    fn test_bind_on_load_skips_macros_without_sections() {
        // Arrange
        let mut registry = MacroRegistry::new();
        let mock = MockMacro::new(None, vars(&[("x", Value::Int(1))]));
        let log = mock.set_log();
        registry.register("unrelated", Box::new(mock));
        let stored = sections(&[("heat_bed", &[("speed", Value::Int(100))])]);

        // Act
        bind_on_load(&stored, &mut registry);

        // Assert: no set_variables call reached the unmatched macro.
        assert!(log.borrow().is_empty());
    }

    // ── apply_named_update ────────────────────────────────────────────────────

    #[test]
    fn test_apply_named_update_sets_variable_and_returns_section() {
        // Arrange
        let mut registry = MacroRegistry::new();
        registry.register(
            "heat_bed",
            Box::new(MockMacro::new(Some("bed"), vars(&[("speed", Value::Int(0))]))),
        );

        // Act
        let section =
            apply_named_update(&mut registry, "bed", "speed", &Value::Int(100)).unwrap();

        // Assert
        assert_eq!(section, "heat_bed");
        assert_eq!(
            registry.get("heat_bed").unwrap().variables()["speed"],
            Value::Int(100)
        );
    }

    #[test]
    fn test_apply_named_update_unknown_alias_is_rejected() {
        let mut registry = MacroRegistry::new();
        registry.register(
            "heat_bed",
            Box::new(MockMacro::new(Some("bed"), vars(&[("speed", Value::Int(0))]))),
        );

        let result = apply_named_update(&mut registry, "nomacro", "speed", &Value::Int(1));

        assert_eq!(result, Err(BindError::UnknownMacroAlias("nomacro".into())));
    }

    #[test]
    fn test_apply_named_update_undeclared_variable_is_rejected() {
        // Arrange
        let mut registry = MacroRegistry::new();
        let mock = MockMacro::new(Some("bed"), vars(&[("speed", Value::Int(0))]));
        let log = mock.set_log();
        registry.register("heat_bed", Box::new(mock));

        // Act
        let result = apply_named_update(&mut registry, "bed", "unknown_var", &Value::Int(1));

        // Assert: rejected, and the macro was never written to.
        assert_eq!(
            result,
            Err(BindError::UnknownVariable {
                macro_name: "heat_bed".into(),
                variable: "unknown_var".into(),
            })
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_apply_named_update_registration_name_is_not_an_alias() {
        // Only the alias targets a macro; its registration name does not.
        let mut registry = MacroRegistry::new();
        registry.register(
            "heat_bed",
            Box::new(MockMacro::new(None, vars(&[("speed", Value::Int(0))]))),
        );

        let result = apply_named_update(&mut registry, "heat_bed", "speed", &Value::Int(1));

        assert_eq!(result, Err(BindError::UnknownMacroAlias("heat_bed".into())));
    }

    #[test]
    fn test_apply_named_update_first_alias_match_wins() {
        // Two macros sharing an alias: registration order decides.
        let mut registry = MacroRegistry::new();
        registry.register(
            "first",
            Box::new(MockMacro::new(Some("shared"), vars(&[("x", Value::Int(0))]))),
        );
        registry.register(
            "second",
            Box::new(MockMacro::new(Some("shared"), vars(&[("x", Value::Int(0))]))),
        );

        let section = apply_named_update(&mut registry, "shared", "x", &Value::Int(9)).unwrap();

        assert_eq!(section, "first");
        assert_eq!(registry.get("second").unwrap().variables()["x"], Value::Int(0));
    }
}
