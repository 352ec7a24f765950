use super::system::MolecularSystem;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Duplicate subsystem name: '{0}'")]
pub struct DuplicateNameError(pub String);

/// Insertion-ordered mapping from subsystem name to subsystem.
///
/// Insertion order is the task submission order and the report row order, so it is
/// preserved exactly. Subsystems are stored behind [`Arc`] so that tasks can reference
/// them for the duration of a computation without copying.
#[derive(Debug, Clone, Default)]
pub struct SystemMap {
    systems: IndexMap<String, Arc<MolecularSystem>>,
}

impl SystemMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named subsystem at the end of the map.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateNameError`] if the name is already taken; names are the keys
    /// results are accumulated and reported under, so they must be unique.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        system: MolecularSystem,
    ) -> Result<(), DuplicateNameError> {
        let name = name.into();
        if self.systems.contains_key(&name) {
            return Err(DuplicateNameError(name));
        }
        self.systems.insert(name, Arc::new(system));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<MolecularSystem>> {
        self.systems.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<(&String, &Arc<MolecularSystem>)> {
        self.systems.get_index(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<MolecularSystem>)> {
        self.systems.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn helium() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        system.add_atom(Element::from_symbol("He").unwrap(), Point3::origin());
        system
    }

    #[test]
    fn preserves_insertion_order() {
        let mut map = SystemMap::new();
        for name in ["c", "a", "b"] {
            map.insert(name, helium()).unwrap();
        }
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(map.get_index(1).unwrap().0, "a");
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut map = SystemMap::new();
        map.insert("dimer", helium()).unwrap();
        let err = map.insert("dimer", helium()).unwrap_err();
        assert_eq!(err, DuplicateNameError("dimer".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn empty_map_reports_empty() {
        let map = SystemMap::new();
        assert!(map.is_empty());
        assert!(map.get("anything").is_none());
    }
}
