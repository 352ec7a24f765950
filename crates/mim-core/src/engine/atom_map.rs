use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use std::collections::HashMap;

/// Maps atom identities to their zero-based position in one system's atom order.
///
/// Keys are identities, not occurrences: when an identity appears more than once (a
/// real atom and its ghost), the last occurrence determines the position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomIndexMap {
    positions: HashMap<AtomId, usize>,
}

impl AtomIndexMap {
    pub fn for_system(system: &MolecularSystem) -> Self {
        let positions = system
            .atoms_iter()
            .enumerate()
            .map(|(index, atom)| (atom.id, index))
            .collect();
        Self { positions }
    }

    #[inline]
    pub fn index_of(&self, id: AtomId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
