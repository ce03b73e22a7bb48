//! Macro registry and the variable-mapping capability.
//!
//! The host runs named "macro" units that hold live variable bindings. The
//! variable store never touches a macro's implementation; it only consumes
//! the narrow capability defined here: read the live variables, replace
//! them wholesale, and ask for the human-chosen alias.
//!
//! The registry only ever holds objects implementing [`MacroVariables`];
//! a macro without variables is simply not registered, so the binder
//! iterates registry entries instead of probing objects at runtime.

use varstore_core::VariableMap;

pub mod mock;

/// The variable-mapping capability exposed by a macro object.
///
/// `variables` returns a snapshot rather than a reference: callers merge
/// into the snapshot and hand the whole map back through `set_variables`,
/// so a macro never observes a half-updated namespace.
pub trait MacroVariables {
    /// Returns a snapshot of the macro's live variable bindings.
    fn variables(&self) -> VariableMap;

    /// Replaces the macro's live variable bindings.
    fn set_variables(&mut self, variables: VariableMap);

    /// Returns the macro's human-chosen alias, if it has one.
    fn alias(&self) -> Option<&str>;
}

/// A macro populated from the host configuration.
///
/// The macro execution engine is an external collaborator; as far as the
/// store is concerned a macro IS its registration name, its optional
/// alias, and its live variables.
pub struct ConfigMacro {
    alias: Option<String>,
    variables: VariableMap,
}

impl ConfigMacro {
    pub fn new(alias: Option<String>, variables: VariableMap) -> Self {
        Self { alias, variables }
    }
}

impl MacroVariables for ConfigMacro {
    fn variables(&self) -> VariableMap {
        self.variables.clone()
    }

    fn set_variables(&mut self, variables: VariableMap) {
        self.variables = variables;
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// A macro known to the registry: registration name plus capability.
pub struct RegisteredMacro {
    name: String,
    inner: Box<dyn MacroVariables>,
}

impl RegisteredMacro {
    /// The registration name, which doubles as the store section a save
    /// targeting this macro persists under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.inner.alias()
    }

    pub fn variables(&self) -> VariableMap {
        self.inner.variables()
    }

    pub fn set_variables(&mut self, variables: VariableMap) {
        self.inner.set_variables(variables);
    }
}

/// In-memory registry of every object of kind macro.
///
/// Entries keep registration order, which makes alias lookup deterministic
/// when two macros share an alias (the earliest registration wins).
#[derive(Default)]
pub struct MacroRegistry {
    entries: Vec<RegisteredMacro>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a macro under `name`. Registering the same name again
    /// replaces the previous entry in place.
    pub fn register(&mut self, name: impl Into<String>, inner: Box<dyn MacroVariables>) {
        let name = name.into();
        match self.entries.iter().position(|entry| entry.name == name) {
            Some(index) => self.entries[index].inner = inner,
            None => self.entries.push(RegisteredMacro { name, inner }),
        }
    }

    /// Returns all registered macros in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMacro> {
        self.entries.iter()
    }

    /// Returns all registered macros mutably, in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegisteredMacro> {
        self.entries.iter_mut()
    }

    /// Returns the macro registered under `name`.
    pub fn get(&self, name: &str) -> Option<&RegisteredMacro> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
