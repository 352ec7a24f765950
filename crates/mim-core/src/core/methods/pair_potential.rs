use super::potentials::{lennard_jones_12_6, lennard_jones_12_6_dr};
use super::{Capability, DerivativeMethod, MethodError};
use crate::core::models::system::MolecularSystem;
use std::collections::HashMap;

/// Lennard-Jones parameters in the `r_min` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LjParameters {
    /// Distance of the potential minimum, Angstrom.
    pub r_min: f64,
    /// Depth of the potential well, kcal/mol.
    pub well_depth: f64,
}

/// A pairwise-additive Lennard-Jones 12-6 potential.
///
/// The basis key selects a parameter set; `primary` and `reduced` use reduced units
/// (`σ = ε = 1`), `argon` uses the classic argon parameters. Ghost atoms take part in
/// the derivative layout but not in any interaction.
#[derive(Debug, Clone)]
pub struct PairPotential {
    parameter_sets: HashMap<String, LjParameters>,
    capabilities: Vec<Capability>,
}

impl PairPotential {
    pub fn lennard_jones() -> Self {
        let reduced = LjParameters {
            r_min: 2f64.powf(1.0 / 6.0),
            well_depth: 1.0,
        };
        let argon = LjParameters {
            r_min: 3.816,
            well_depth: 0.2381,
        };
        let parameter_sets = HashMap::from([
            ("primary".to_string(), reduced),
            ("reduced".to_string(), reduced),
            ("argon".to_string(), argon),
        ]);
        Self {
            parameter_sets,
            capabilities: vec![Capability::Energy, Capability::Gradient],
        }
    }

    /// Drops the analytic gradient, leaving energies only.
    pub fn energy_only(mut self) -> Self {
        self.capabilities = vec![Capability::Energy];
        self
    }

    pub fn with_parameter_set(mut self, basis: impl Into<String>, params: LjParameters) -> Self {
        self.parameter_sets.insert(basis.into(), params);
        self
    }

    fn parameters(&self, basis: &str) -> Result<LjParameters, MethodError> {
        self.parameter_sets
            .get(basis)
            .copied()
            .ok_or_else(|| MethodError::UnknownBasis {
                method: self.name().to_string(),
                basis: basis.to_string(),
            })
    }

    fn energy(&self, system: &MolecularSystem, params: LjParameters) -> f64 {
        let atoms = system.atoms();
        let mut energy = 0.0;
        for i in 0..atoms.len() {
            if atoms[i].ghost {
                continue;
            }
            for j in (i + 1)..atoms.len() {
                if atoms[j].ghost {
                    continue;
                }
                let r = atoms[i].distance_to(&atoms[j]);
                energy += lennard_jones_12_6(r, params.r_min, params.well_depth);
            }
        }
        energy
    }

    fn gradient(&self, system: &MolecularSystem, params: LjParameters) -> Vec<f64> {
        let atoms = system.atoms();
        let mut gradient = vec![0.0; 3 * atoms.len()];
        for i in 0..atoms.len() {
            if atoms[i].ghost {
                continue;
            }
            for j in (i + 1)..atoms.len() {
                if atoms[j].ghost {
                    continue;
                }
                let r_vec = atoms[i].position - atoms[j].position;
                let r = r_vec.norm();
                let de_dr = lennard_jones_12_6_dr(r, params.r_min, params.well_depth);
                if de_dr == 0.0 {
                    continue;
                }
                let force = r_vec * (de_dr / r);
                for c in 0..3 {
                    gradient[3 * i + c] += force[c];
                    gradient[3 * j + c] -= force[c];
                }
            }
        }
        gradient
    }
}

/// Rejects systems no method could meaningfully evaluate.
pub fn validate_system(system: &MolecularSystem) -> Result<(), MethodError> {
    if system.is_empty() {
        return Err(MethodError::UnsetSystem);
    }
    let electrons = system.electron_count();
    let multiplicity = system.multiplicity();
    let unpaired = i64::from(multiplicity) - 1;
    if electrons < 0 || multiplicity == 0 || unpaired > electrons || (electrons - unpaired) % 2 != 0
    {
        return Err(MethodError::ElectronCount {
            electrons,
            multiplicity,
        });
    }
    Ok(())
}

impl DerivativeMethod for PairPotential {
    fn name(&self) -> &str {
        "lennard-jones"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn deriv(
        &self,
        system: &MolecularSystem,
        basis: &str,
        order: usize,
    ) -> Result<Vec<f64>, MethodError> {
        validate_system(system)?;
        let params = self.parameters(basis)?;
        if !self.supports(order) {
            return Err(MethodError::UnsupportedOrder {
                method: self.name().to_string(),
                order,
            });
        }
        match order {
            0 => Ok(vec![self.energy(system, params)]),
            _ => Ok(self.gradient(system, params)),
        }
    }
}
