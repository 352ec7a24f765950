use super::atom::Atom;
use super::element::Element;
use super::ids::AtomId;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Atom {0} is not part of the system")]
pub struct UnknownAtomError(pub AtomId);

/// An ordered collection of atoms with a total charge and spin multiplicity.
///
/// The atom order is the system's canonical ordering: derivative vectors produced for
/// a system list atoms in exactly this order. Systems are cheap to clone and fully
/// self-describing, so a subsystem can be handed to any worker (or serialized to
/// another process) without reference to the system it was cut from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolecularSystem {
    atoms: Vec<Atom>,
    charge: i32,
    multiplicity: u32,
    next_id: usize,
}

impl Default for MolecularSystem {
    fn default() -> Self {
        Self {
            atoms: Vec::new(),
            charge: 0,
            multiplicity: 1,
            next_id: 0,
        }
    }
}

impl MolecularSystem {
    /// Creates an empty, neutral singlet system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total charge and spin multiplicity.
    pub fn with_charge(mut self, charge: i32, multiplicity: u32) -> Self {
        self.charge = charge;
        self.multiplicity = multiplicity;
        self
    }

    /// Appends a new real atom and returns its freshly assigned identity.
    pub fn add_atom(&mut self, element: Element, position: Point3<f64>) -> AtomId {
        let id = AtomId(self.next_id);
        self.push_atom(Atom::new(id, element, position));
        id
    }

    /// Appends an existing atom, keeping its identity.
    ///
    /// The same identity may appear more than once (e.g. a real atom and its ghost).
    pub fn push_atom(&mut self, atom: Atom) {
        self.next_id = self.next_id.max(atom.id.0 + 1);
        self.atoms.push(atom);
    }

    /// Returns the first atom carrying the given identity.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.iter().find(|atom| atom.id == id)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    /// Number of atom entries, ghosts included.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.atoms.iter().any(|atom| atom.id == id)
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    /// Total electron count: nuclear charge of the real atoms minus the system charge.
    pub fn electron_count(&self) -> i64 {
        self.atoms.iter().map(Atom::electrons).sum::<i64>() - i64::from(self.charge)
    }

    /// Cuts a subsystem out of this system.
    ///
    /// Atoms keep their identities and appear in the order given by `ids`. A selection
    /// of every atom keeps this system's charge and multiplicity. Any other selection is
    /// neutral with the lowest spin multiplicity consistent with its electron count
    /// (singlet for even, doublet for odd).
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAtomError`] if any identity is not part of this system.
    pub fn subsystem(&self, ids: &[AtomId]) -> Result<MolecularSystem, UnknownAtomError> {
        self.with_ghosts(ids, &[])
    }

    /// Like [`subsystem`](Self::subsystem), additionally appending ghost copies of `ghosts`.
    pub fn with_ghosts(
        &self,
        real: &[AtomId],
        ghosts: &[AtomId],
    ) -> Result<MolecularSystem, UnknownAtomError> {
        let mut sub = MolecularSystem::new();
        for &id in real {
            let atom = self.atom(id).ok_or(UnknownAtomError(id))?;
            sub.push_atom(atom.clone());
        }
        for &id in ghosts {
            let atom = self.atom(id).ok_or(UnknownAtomError(id))?;
            sub.push_atom(atom.to_ghost());
        }
        if self.is_selected_whole(real) {
            sub.charge = self.charge;
            sub.multiplicity = self.multiplicity;
        } else {
            sub.multiplicity = if sub.electron_count() % 2 == 0 { 1 } else { 2 };
        }
        Ok(sub)
    }

    fn is_selected_whole(&self, real: &[AtomId]) -> bool {
        real.len() == self.atoms.len() && self.atoms.iter().all(|atom| real.contains(&atom.id))
    }

    /// Returns a copy with one Cartesian coordinate of the atom at `index` shifted by `delta`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or `component > 2`.
    pub fn displaced(&self, index: usize, component: usize, delta: f64) -> MolecularSystem {
        let mut moved = self.clone();
        moved.atoms[index].position[component] += delta;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(symbol: &str) -> Element {
        Element::from_symbol(symbol).unwrap()
    }

    fn water() -> (MolecularSystem, [AtomId; 3]) {
        let mut system = MolecularSystem::new();
        let o = system.add_atom(element("O"), Point3::new(0.0, 0.0, 0.0));
        let h1 = system.add_atom(element("H"), Point3::new(0.96, 0.0, 0.0));
        let h2 = system.add_atom(element("H"), Point3::new(-0.24, 0.93, 0.0));
        (system, [o, h1, h2])
    }

    #[test]
    fn atoms_receive_sequential_identities() {
        let (system, ids) = water();
        assert_eq!(ids, [AtomId(0), AtomId(1), AtomId(2)]);
        assert_eq!(system.len(), 3);
        assert_eq!(system.atom(AtomId(1)).unwrap().element.symbol(), "H");
    }

    #[test]
    fn electron_count_accounts_for_charge() {
        let (system, _) = water();
        assert_eq!(system.electron_count(), 10);
        let cation = system.with_charge(1, 2);
        assert_eq!(cation.electron_count(), 9);
        assert_eq!(cation.multiplicity(), 2);
    }

    #[test]
    fn subsystem_preserves_identity_and_requested_order() {
        let (system, [o, h1, _]) = water();
        let sub = system.subsystem(&[h1, o]).unwrap();
        let ids: Vec<_> = sub.atoms_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![h1, o]);
        assert_eq!(sub.charge(), 0);
    }

    #[test]
    fn subsystem_picks_lowest_consistent_multiplicity() {
        let (system, [o, h1, _]) = water();
        assert_eq!(system.subsystem(&[h1]).unwrap().multiplicity(), 2);
        assert_eq!(system.subsystem(&[o]).unwrap().multiplicity(), 1);
        assert_eq!(system.subsystem(&[o, h1]).unwrap().multiplicity(), 2);
    }

    #[test]
    fn selecting_every_atom_keeps_charge_and_multiplicity() {
        let (system, [o, h1, h2]) = water();
        let cation = system.with_charge(1, 4);
        let reordered = cation.subsystem(&[h2, o, h1]).unwrap();
        assert_eq!((reordered.charge(), reordered.multiplicity()), (1, 4));
        let partial = cation.subsystem(&[o, h1]).unwrap();
        assert_eq!((partial.charge(), partial.multiplicity()), (0, 2));
    }

    #[test]
    fn subsystem_with_unknown_atom_fails() {
        let (system, _) = water();
        assert_eq!(
            system.subsystem(&[AtomId(42)]),
            Err(UnknownAtomError(AtomId(42)))
        );
    }

    #[test]
    fn ghosts_keep_identity_but_carry_no_electrons() {
        let (system, [o, h1, h2]) = water();
        let sub = system.with_ghosts(&[o], &[h1, h2]).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.electron_count(), 8);
        assert!(sub.atoms()[1].ghost);
        assert_eq!(sub.atoms()[1].id, h1);
    }

    #[test]
    fn new_atoms_after_push_do_not_reuse_identities() {
        let (system, [_, _, h2]) = water();
        let mut sub = system.subsystem(&[h2]).unwrap();
        let fresh = sub.add_atom(element("He"), Point3::origin());
        assert_eq!(fresh, AtomId(3));
    }

    #[test]
    fn displaced_moves_a_single_coordinate() {
        let (system, _) = water();
        let moved = system.displaced(1, 2, 0.5);
        assert_eq!(moved.atoms()[1].position, Point3::new(0.96, 0.0, 0.5));
        assert_eq!(moved.atoms()[0].position, system.atoms()[0].position);
    }
}
