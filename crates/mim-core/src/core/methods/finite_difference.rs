use super::{Capability, DerivativeMethod, MethodError, derivative_length};
use crate::core::models::system::MolecularSystem;
use tracing::trace;

pub const DEFAULT_STEP: f64 = 1e-4;

const ALL_ORDERS: [Capability; 3] = [
    Capability::Energy,
    Capability::Gradient,
    Capability::HigherDerivative,
];

/// Extends a method to arbitrary derivative orders by central finite differences.
///
/// Orders the inner method supports natively are delegated unchanged. Any other order
/// `k` is assembled from displaced order `k - 1` derivatives, recursing until a native
/// order is reached, so an energy-only method yields gradients, Hessians and beyond.
#[derive(Debug, Clone)]
pub struct FiniteDifference<M> {
    inner: M,
    step: f64,
}

impl<M: DerivativeMethod> FiniteDifference<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    fn central_difference(
        &self,
        system: &MolecularSystem,
        basis: &str,
        order: usize,
    ) -> Result<Vec<f64>, MethodError> {
        let dofs = 3 * system.len();
        let too_large = || MethodError::UnsupportedOrder {
            method: self.name().to_string(),
            order,
        };
        let block = derivative_length(system.len(), order - 1).ok_or_else(too_large)?;
        let mut result = vec![0.0; derivative_length(system.len(), order).ok_or_else(too_large)?];
        trace!(
            "Central differences for order {} over {} coordinates",
            order, dofs
        );

        for dof in 0..dofs {
            let (atom, component) = (dof / 3, dof % 3);
            let plus = self.deriv(&system.displaced(atom, component, self.step), basis, order - 1)?;
            let minus =
                self.deriv(&system.displaced(atom, component, -self.step), basis, order - 1)?;
            let row = &mut result[dof * block..(dof + 1) * block];
            for ((out, p), m) in row.iter_mut().zip(&plus).zip(&minus) {
                *out = (p - m) / (2.0 * self.step);
            }
        }
        Ok(result)
    }
}

impl<M: DerivativeMethod> DerivativeMethod for FiniteDifference<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> &[Capability] {
        &ALL_ORDERS
    }

    fn deriv(
        &self,
        system: &MolecularSystem,
        basis: &str,
        order: usize,
    ) -> Result<Vec<f64>, MethodError> {
        if self.inner.supports(order) || order == 0 {
            return self.inner.deriv(system, basis, order);
        }
        if system.is_empty() {
            return Err(MethodError::UnsetSystem);
        }
        self.central_difference(system, basis, order)
    }
}
