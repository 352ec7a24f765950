use super::element::Element;
use super::ids::AtomId;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Represents an atom of a molecular system.
///
/// The `id` is the atom's identity: it is assigned when the atom enters the whole
/// system and is carried unchanged into every subsystem that selects it. Position and
/// element describe the physics; `ghost` marks a basis-only copy used by counterpoise
/// style fragmentations, which contributes no nuclei and no electrons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Identity shared with every copy of this atom in other subsystems.
    pub id: AtomId,
    /// The chemical element.
    pub element: Element,
    /// Cartesian coordinates in Angstrom.
    pub position: Point3<f64>,
    /// Whether this is a ghost (basis functions only) atom.
    pub ghost: bool,
}

impl Atom {
    /// Creates a new, real (non-ghost) atom.
    ///
    /// # Arguments
    ///
    /// * `id` - The identity of the atom.
    /// * `element` - The chemical element.
    /// * `position` - The Cartesian coordinates of the atom.
    pub fn new(id: AtomId, element: Element, position: Point3<f64>) -> Self {
        Self {
            id,
            element,
            position,
            ghost: false,
        }
    }

    /// Returns a ghost copy of this atom with the same identity.
    pub fn to_ghost(&self) -> Self {
        Self {
            ghost: true,
            ..self.clone()
        }
    }

    /// Number of electrons contributed by this atom to a neutral system.
    pub fn electrons(&self) -> i64 {
        if self.ghost {
            0
        } else {
            i64::from(self.element.atomic_number())
        }
    }

    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon(id: usize) -> Atom {
        Atom::new(
            AtomId(id),
            Element::from_symbol("C").unwrap(),
            Point3::new(1.0, 2.0, 3.0),
        )
    }

    #[test]
    fn new_atom_is_not_a_ghost() {
        let atom = carbon(4);
        assert_eq!(atom.id, AtomId(4));
        assert!(!atom.ghost);
        assert_eq!(atom.electrons(), 6);
    }

    #[test]
    fn ghost_copy_keeps_identity_and_drops_electrons() {
        let atom = carbon(2);
        let ghost = atom.to_ghost();
        assert_eq!(ghost.id, atom.id);
        assert_eq!(ghost.position, atom.position);
        assert!(ghost.ghost);
        assert_eq!(ghost.electrons(), 0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = carbon(0);
        let mut b = carbon(1);
        b.position = Point3::new(4.0, 6.0, 3.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
