use super::atom_map::AtomIndexMap;
use super::config::derivative_size;
use super::error::EngineError;
use crate::core::models::system::MolecularSystem;

/// Owner of the whole-system derivative tensor.
///
/// The tensor is a flat, zero-initialised buffer of length `(3·N)^order`, row-major with
/// atoms in the whole system's order and Cartesian components innermost. Contributions
/// are added one subsystem at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeAccumulator {
    order: usize,
    atoms: usize,
    values: Vec<f64>,
}

impl DerivativeAccumulator {
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the tensor is too large to allocate.
    pub fn new(whole_atoms: usize, order: usize) -> Result<Self, EngineError> {
        Ok(Self {
            order,
            atoms: whole_atoms,
            values: vec![0.0; derivative_size(whole_atoms, order)?],
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Adds `coefficient · local` into the global tensor.
    ///
    /// Every atom occurrence of `subsystem` contributes its three Cartesian degrees of
    /// freedom, translated from its local position (`sub_map`) to its whole-system
    /// position (`whole_map`). For order `k` every `k`-tuple of those degrees of freedom
    /// is mapped, with stride `3n` locally and `3N` globally.
    ///
    /// # Errors
    ///
    /// - [`EngineError::DerivativeLength`] if `local` is not `(3n)^order` long.
    /// - [`EngineError::Mapping`] if an atom of the subsystem is missing from either map.
    pub fn accumulate(
        &mut self,
        local: &[f64],
        coefficient: f64,
        name: &str,
        subsystem: &MolecularSystem,
        whole_map: &AtomIndexMap,
        sub_map: &AtomIndexMap,
    ) -> Result<(), EngineError> {
        let expected = derivative_size(subsystem.len(), self.order)?;
        if local.len() != expected {
            return Err(EngineError::DerivativeLength {
                subsystem: name.to_string(),
                expected,
                found: local.len(),
            });
        }

        let mut dofs = Vec::with_capacity(3 * subsystem.len());
        for atom in subsystem.atoms_iter() {
            let unmapped = || EngineError::Mapping {
                atom: atom.id,
                subsystem: name.to_string(),
            };
            let l = sub_map.index_of(atom.id).ok_or_else(unmapped)?;
            let g = whole_map.index_of(atom.id).ok_or_else(unmapped)?;
            for c in 0..3 {
                dofs.push((3 * l + c, 3 * g + c));
            }
        }

        if self.order > 0 && dofs.is_empty() {
            return Ok(());
        }

        let local_stride = 3 * subsystem.len();
        let global_stride = 3 * self.atoms;
        let mut digits = vec![0usize; self.order];
        loop {
            let (mut li, mut gi) = (0, 0);
            for &d in &digits {
                let (l, g) = dofs[d];
                li = li * local_stride + l;
                gi = gi * global_stride + g;
            }
            self.values[gi] += coefficient * local[li];

            // Odometer over k-tuples, last index fastest.
            let mut pos = digits.len();
            loop {
                if pos == 0 {
                    return Ok(());
                }
                pos -= 1;
                digits[pos] += 1;
                if digits[pos] < dofs.len() {
                    break;
                }
                digits[pos] = 0;
            }
        }
    }
}
