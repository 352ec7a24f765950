use super::FragmentError;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use std::fmt;
use std::str::FromStr;

/// Two atoms are bonded when closer than this factor times the sum of covalent radii.
const BOND_TOLERANCE: f64 = 1.2;

/// How a system is split into monomers before any n-mer expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonomerScheme {
    /// The whole system is a single monomer.
    Null,
    /// Every atom is its own monomer.
    Atomic,
    /// Covalently bonded components are monomers.
    Bonded,
}

impl MonomerScheme {
    /// Splits the system into monomers, each a list of atom identities.
    ///
    /// Monomers are ordered by their first atom in the system's canonical order, and
    /// atoms within a monomer keep that order.
    pub fn monomers(&self, system: &MolecularSystem) -> Vec<Vec<AtomId>> {
        match self {
            Self::Null => {
                if system.is_empty() {
                    Vec::new()
                } else {
                    vec![system.atoms_iter().map(|a| a.id).collect()]
                }
            }
            Self::Atomic => system.atoms_iter().map(|a| vec![a.id]).collect(),
            Self::Bonded => bonded_components(system),
        }
    }
}

fn bonded_components(system: &MolecularSystem) -> Vec<Vec<AtomId>> {
    let atoms = system.atoms();
    let mut parent: Vec<usize> = (0..atoms.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..atoms.len() {
        for j in (i + 1)..atoms.len() {
            let cutoff = BOND_TOLERANCE
                * (atoms[i].element.covalent_radius() + atoms[j].element.covalent_radius());
            if atoms[i].distance_to(&atoms[j]) <= cutoff {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }
    }

    let mut components: Vec<(usize, Vec<AtomId>)> = Vec::new();
    for (i, atom) in atoms.iter().enumerate() {
        let root = find(&mut parent, i);
        match components.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(atom.id),
            None => components.push((root, vec![atom.id])),
        }
    }
    components.into_iter().map(|(_, members)| members).collect()
}

impl FromStr for MonomerScheme {
    type Err = FragmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "null" | "none" | "whole" => Ok(Self::Null),
            "atomic" | "atoms" => Ok(Self::Atomic),
            "bonded" | "bond" | "covalent" => Ok(Self::Bonded),
            _ => Err(FragmentError::UnknownScheme(s.to_string())),
        }
    }
}

impl fmt::Display for MonomerScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Atomic => "atomic",
            Self::Bonded => "bonded",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn two_waters() -> MolecularSystem {
        let o = Element::from_symbol("O").unwrap();
        let h = Element::from_symbol("H").unwrap();
        let mut system = MolecularSystem::new();
        system.add_atom(o, Point3::new(0.0, 0.0, 0.0));
        system.add_atom(o, Point3::new(3.0, 0.0, 0.0));
        system.add_atom(h, Point3::new(0.96, 0.0, 0.0));
        system.add_atom(h, Point3::new(3.96, 0.0, 0.0));
        system.add_atom(h, Point3::new(-0.24, 0.93, 0.0));
        system.add_atom(h, Point3::new(2.76, 0.93, 0.0));
        system
    }

    #[test]
    fn null_scheme_returns_whole_system() {
        let system = two_waters();
        let monomers = MonomerScheme::Null.monomers(&system);
        assert_eq!(monomers.len(), 1);
        assert_eq!(monomers[0].len(), 6);
        assert!(MonomerScheme::Null.monomers(&MolecularSystem::new()).is_empty());
    }

    #[test]
    fn atomic_scheme_returns_one_monomer_per_atom() {
        let monomers = MonomerScheme::Atomic.monomers(&two_waters());
        assert_eq!(monomers.len(), 6);
        assert_eq!(monomers[3], vec![AtomId(3)]);
    }

    #[test]
    fn bonded_scheme_groups_covalent_components() {
        let monomers = MonomerScheme::Bonded.monomers(&two_waters());
        assert_eq!(
            monomers,
            vec![
                vec![AtomId(0), AtomId(2), AtomId(4)],
                vec![AtomId(1), AtomId(3), AtomId(5)],
            ]
        );
    }

    #[test]
    fn scheme_names_parse_case_insensitively() {
        assert_eq!("NULL".parse::<MonomerScheme>(), Ok(MonomerScheme::Null));
        assert_eq!("Atomic".parse::<MonomerScheme>(), Ok(MonomerScheme::Atomic));
        assert_eq!("bonded".parse::<MonomerScheme>(), Ok(MonomerScheme::Bonded));
        assert!("graph".parse::<MonomerScheme>().is_err());
    }
}
