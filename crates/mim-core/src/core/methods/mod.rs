//! # Methods Module
//!
//! The capability interface through which the engine obtains fragment derivatives.
//!
//! The engine never knows how a fragment's energy is computed. It resolves a method key
//! through an injected [`MethodProvider`] and calls [`DerivativeMethod::deriv`], which
//! must return a flat vector of `(3·n)^order` values for an `n`-atom subsystem.
//!
//! ## Bundled backends
//!
//! - [`pair_potential::PairPotential`] - Lennard-Jones 12-6 pair energies with analytic gradients
//! - [`finite_difference::FiniteDifference`] - Raises any backend to higher derivative
//!   orders by central differences
//!
//! Both exist so the engine can be exercised end to end; neither is an
//! electronic-structure method.

pub mod finite_difference;
pub mod pair_potential;
pub mod potentials;

use crate::core::models::system::MolecularSystem;
use finite_difference::FiniteDifference;
use pair_potential::PairPotential;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MethodError {
    #[error("No system was provided (the subsystem has no atoms)")]
    UnsetSystem,

    #[error(
        "Electron count {electrons} is inconsistent with multiplicity {multiplicity}"
    )]
    ElectronCount { electrons: i64, multiplicity: u32 },

    #[error("Method '{method}' cannot provide derivatives of order {order}")]
    UnsupportedOrder { method: String, order: usize },

    #[error("Method '{method}' does not know the basis or parameter set '{basis}'")]
    UnknownBasis { method: String, basis: String },

    #[error("No method is registered under the key '{0}'")]
    UnknownMethod(String),

    #[error("Method returned {found} values; order {order} for {atoms} atoms requires {expected}")]
    WrongLength {
        order: usize,
        atoms: usize,
        expected: usize,
        found: usize,
    },

    #[error("Method failed: {0}")]
    Failed(String),
}

/// What a method can compute natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Order 0.
    Energy,
    /// Order 1.
    Gradient,
    /// Any order of 2 or above.
    HigherDerivative,
}

impl Capability {
    pub fn for_order(order: usize) -> Self {
        match order {
            0 => Self::Energy,
            1 => Self::Gradient,
            _ => Self::HigherDerivative,
        }
    }
}

/// Length of a flat derivative of the given order for `atoms` atoms: `(3·atoms)^order`.
///
/// Returns `None` when such a tensor cannot be held in memory: the element count
/// overflows `usize` or the buffer would exceed `isize::MAX` bytes.
pub fn derivative_length(atoms: usize, order: usize) -> Option<usize> {
    let exponent = u32::try_from(order).ok()?;
    let len = 3usize.checked_mul(atoms)?.checked_pow(exponent)?;
    let bytes = len.checked_mul(std::mem::size_of::<f64>())?;
    (bytes <= isize::MAX as usize).then_some(len)
}

/// A backend that computes energy derivatives of a (sub)system.
///
/// Implementations must be free of shared mutable state: the scheduler calls `deriv`
/// concurrently from several worker threads.
pub trait DerivativeMethod: Send + Sync {
    /// Short human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// The derivative orders this method computes natively.
    fn capabilities(&self) -> &[Capability];

    fn supports(&self, order: usize) -> bool {
        self.capabilities().contains(&Capability::for_order(order))
    }

    /// Computes the `order`-th derivative of the energy of `system` in `basis`.
    ///
    /// The result is row-major with atoms in the system's order and Cartesian
    /// components innermost, of length [`derivative_length`]`(system.len(), order)`.
    ///
    /// # Errors
    ///
    /// Returns a [`MethodError`] if the system, basis or order is not usable.
    fn deriv(
        &self,
        system: &MolecularSystem,
        basis: &str,
        order: usize,
    ) -> Result<Vec<f64>, MethodError>;
}

/// Resolves method keys into method instances.
pub trait MethodProvider: Send + Sync {
    fn resolve(&self, key: &str) -> Result<Arc<dyn DerivativeMethod>, MethodError>;
}

/// A [`MethodProvider`] backed by an explicit table of registered methods.
#[derive(Default, Clone)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn DerivativeMethod>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the bundled backends:
    ///
    /// - `lennard-jones`: analytic energies and gradients, finite-difference beyond;
    /// - `lennard-jones-numeric`: energies only, every derivative by finite difference.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            "lennard-jones",
            FiniteDifference::new(PairPotential::lennard_jones()),
        );
        registry.register(
            "lennard-jones-numeric",
            FiniteDifference::new(PairPotential::lennard_jones().energy_only()),
        );
        registry
    }

    /// Registers a method under `key`, replacing any previous registration.
    pub fn register(&mut self, key: impl Into<String>, method: impl DerivativeMethod + 'static) {
        self.methods.insert(key.into(), Arc::new(method));
    }

    pub fn register_shared(&mut self, key: impl Into<String>, method: Arc<dyn DerivativeMethod>) {
        self.methods.insert(key.into(), method);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl MethodProvider for MethodRegistry {
    fn resolve(&self, key: &str) -> Result<Arc<dyn DerivativeMethod>, MethodError> {
        self.methods
            .get(key)
            .cloned()
            .ok_or_else(|| MethodError::UnknownMethod(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl DerivativeMethod for Constant {
        fn name(&self) -> &str {
            "constant"
        }
        fn capabilities(&self) -> &[Capability] {
            &[Capability::Energy]
        }
        fn deriv(
            &self,
            _system: &MolecularSystem,
            _basis: &str,
            _order: usize,
        ) -> Result<Vec<f64>, MethodError> {
            Ok(vec![42.0])
        }
    }

    #[test]
    fn capability_for_order_maps_all_orders() {
        assert_eq!(Capability::for_order(0), Capability::Energy);
        assert_eq!(Capability::for_order(1), Capability::Gradient);
        assert_eq!(Capability::for_order(2), Capability::HigherDerivative);
        assert_eq!(Capability::for_order(7), Capability::HigherDerivative);
    }

    #[test]
    fn derivative_length_follows_striding_rule() {
        assert_eq!(derivative_length(5, 0), Some(1));
        assert_eq!(derivative_length(5, 1), Some(15));
        assert_eq!(derivative_length(2, 2), Some(36));
    }

    #[test]
    fn derivative_length_refuses_overflowing_tensors() {
        assert_eq!(derivative_length(2, 25), None);
        assert_eq!(derivative_length(usize::MAX, 1), None);
        assert_eq!(derivative_length(1, u32::MAX as usize + 1), None);
        assert_eq!(derivative_length(1, 15), Some(14_348_907));
    }

    #[test]
    fn supports_is_derived_from_capabilities() {
        assert!(Constant.supports(0));
        assert!(!Constant.supports(1));
    }

    #[test]
    fn registry_resolves_registered_methods() {
        let mut registry = MethodRegistry::new();
        registry.register("const", Constant);
        let method = registry.resolve("const").unwrap();
        assert_eq!(method.name(), "constant");
        assert_eq!(
            method.deriv(&MolecularSystem::new(), "any", 0).unwrap(),
            vec![42.0]
        );
    }

    #[test]
    fn shared_registration_hands_out_the_same_instance() {
        let shared: Arc<dyn DerivativeMethod> = Arc::new(Constant);
        let mut registry = MethodRegistry::new();
        registry.register_shared("first", Arc::clone(&shared));
        registry.register_shared("second", Arc::clone(&shared));
        let first = registry.resolve("first").unwrap();
        let second = registry.resolve("second").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(Arc::strong_count(&shared), 5);
    }

    #[test]
    fn registry_rejects_unknown_keys() {
        let registry = MethodRegistry::new();
        assert_eq!(
            registry.resolve("ccsd(t)").err(),
            Some(MethodError::UnknownMethod("ccsd(t)".to_string()))
        );
    }

    #[test]
    fn builtin_registry_contains_pair_potentials() {
        let registry = MethodRegistry::with_builtin();
        let mut keys: Vec<_> = registry.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["lennard-jones", "lennard-jones-numeric"]);
        assert!(registry.resolve("lennard-jones").unwrap().supports(2));
    }
}
