//! Mock macro for unit testing.
//!
//! Lets tests stand in for a live macro object without the execution
//! engine. The mock records every `set_variables` call through a shared
//! log handle, so a test can keep the handle and assert on calls after the
//! mock itself has been boxed into the registry.

use std::cell::RefCell;
use std::rc::Rc;

use varstore_core::VariableMap;

use super::MacroVariables;

/// A mock implementation of [`MacroVariables`] that records updates.
pub struct MockMacro {
    alias: Option<String>,
    variables: VariableMap,
    set_log: Rc<RefCell<Vec<VariableMap>>>,
}

impl MockMacro {
    /// Creates a mock with the given alias and initial live variables.
    pub fn new(alias: Option<&str>, variables: VariableMap) -> Self {
        Self {
            alias: alias.map(str::to_string),
            variables,
            set_log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Returns a handle to the log of `set_variables` calls. Clone it
    /// before registering the mock; each entry is the full map that was
    /// applied.
    pub fn set_log(&self) -> Rc<RefCell<Vec<VariableMap>>> {
        Rc::clone(&self.set_log)
    }
}

impl MacroVariables for MockMacro {
    fn variables(&self) -> VariableMap {
        self.variables.clone()
    }

    fn set_variables(&mut self, variables: VariableMap) {
        self.set_log.borrow_mut().push(variables.clone());
        self.variables = variables;
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varstore_core::Value;

    #[test]
    fn test_mock_macro_records_set_calls() {
        // Arrange
        let mut mock = MockMacro::new(Some("bed"), VariableMap::new());
        let log = mock.set_log();

        // Act
        let mut update = VariableMap::new();
        update.insert("speed".to_string(), Value::Int(100));
        mock.set_variables(update.clone());

        // Assert
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], update);
        assert_eq!(mock.variables(), update);
    }

    #[test]
    fn test_mock_macro_exposes_alias() {
        let mock = MockMacro::new(Some("bed"), VariableMap::new());
        assert_eq!(mock.alias(), Some("bed"));
        let anon = MockMacro::new(None, VariableMap::new());
        assert_eq!(anon.alias(), None);
    }
}
