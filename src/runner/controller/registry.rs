//! Controller registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::types::ControllerDefinition;

/// Name → definition map. The last `set` for a name wins.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    controllers: HashMap<String, ControllerDefinition>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            controllers: HashMap::new(),
        }
    }

    /// Look up a definition by exact name.
    pub fn get(&self, name: &str) -> Option<&ControllerDefinition> {
        self.controllers.get(name)
    }

    /// Store `definition` under `name`, replacing any previous entry.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        definition: impl Into<ControllerDefinition>,
    ) -> ControllerDefinition {
        let definition = definition.into();
        self.controllers.insert(name.into(), definition.clone());
        definition
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl<K: Into<String>, D: Into<ControllerDefinition>> FromIterator<(K, D)> for Registry {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for (name, definition) in iter {
            registry.set(name, definition);
        }
        registry
    }
}

/// Shared handle to a binder's registry.
///
/// Constructors and hooks can hold one to register controllers while a run
/// is in progress; such registrations are seen by the next run.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    inner: Rc<RefCell<Registry>>,
}

impl RegistryHandle {
    pub fn new(registry: Registry) -> Self {
        RegistryHandle {
            inner: Rc::new(RefCell::new(registry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<ControllerDefinition> {
        self.inner.borrow().get(name).cloned()
    }

    pub fn set(
        &self,
        name: impl Into<String>,
        definition: impl Into<ControllerDefinition>,
    ) -> ControllerDefinition {
        self.inner.borrow_mut().set(name, definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.borrow().contains(name)
    }

    /// Copy of the current registry contents.
    pub fn snapshot(&self) -> Registry {
        self.inner.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::controller::types::Constructor;

    fn unit_ctor() -> Constructor {
        Constructor::new(|_| Ok(()))
    }

    #[test]
    fn test_set_returns_stored_definition() {
        let mut registry = Registry::new();
        let ctor = unit_ctor();
        let stored = registry.set("tabs", ctor.clone());
        assert_eq!(stored, ControllerDefinition::Bare(ctor));
        assert_eq!(registry.get("tabs"), Some(&stored));
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry: Registry = vec![("tabs", unit_ctor())].into_iter().collect();
        assert!(registry.get("Tabs").is_none());
        assert!(registry.get("tab").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let handle = RegistryHandle::default();
        handle.set("a", unit_ctor());
        let snapshot = handle.snapshot();
        handle.set("b", unit_ctor());

        assert_eq!(snapshot.names(), vec!["a"]);
        assert!(handle.contains("b"));
    }
}
