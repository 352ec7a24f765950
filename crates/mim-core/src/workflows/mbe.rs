use super::mim::{self, MimContext, MimResult};
use crate::core::fragment::FragmentError;
use crate::core::fragment::key::FragmenterKey;
use crate::core::fragment::nmer::nmer_members;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::{MbeConfig, MimConfig, MimConfigBuilder};
use crate::engine::error::EngineError;
use tracing::{info, instrument};

/// Generalised binomial coefficient, zero when `k > n` or `n < 0`.
fn binomial(n: i64, k: i64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if n < k || n < 0 || k < 0 {
        return 0.0;
    }
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Coefficient of a `body`-mer in an expansion over `monomers` monomers truncated at
/// `truncation`: `(-1)^(n-k) · C(N-k-1, n-k)`.
pub fn coefficient(monomers: usize, truncation: usize, body: usize) -> f64 {
    if body > truncation {
        return 0.0;
    }
    let excess = (truncation - body) as i64;
    let sign = if excess % 2 == 0 { 1.0 } else { -1.0 };
    sign * binomial(monomers as i64 - body as i64 - 1, excess)
}

/// Coefficients of every n-mer, in the order the n-mer fragmenter emits them.
pub fn weights(monomers: usize, truncation: usize) -> Vec<f64> {
    nmer_members(monomers, truncation)
        .map(|members| coefficient(monomers, truncation, members.len()))
        .collect()
}

/// Translates an MBE request into the equivalent MIM configuration.
///
/// The base scheme is run once to count monomers; the returned configuration selects
/// the `scheme@n` fragmenter and carries one coefficient per n-mer. Terms whose
/// coefficient is zero are kept.
pub fn plan(
    system: &MolecularSystem,
    config: &MbeConfig,
    context: &MimContext,
) -> Result<MimConfig, EngineError> {
    let base_key: FragmenterKey = config.base_fragmentizer.parse()?;
    let monomers = context
        .fragmenters
        .resolve(&config.base_fragmentizer)?
        .fragmentize(system)?
        .len();
    if config.truncation > monomers {
        return Err(FragmentError::TruncationTooLarge {
            policy: base_key.to_string(),
            order: config.truncation,
            monomers,
        }
        .into());
    }

    let nmer_key = FragmenterKey {
        scheme: base_key.scheme,
        truncation: Some(config.truncation),
    };
    let mut builder = MimConfigBuilder::new()
        .methods(config.methods.iter().cloned())
        .basis_sets(config.basis_sets.iter().cloned())
        .weights(weights(monomers, config.truncation))
        .fragmentizer(nmer_key.to_string());
    if let Some(workers) = config.max_workers {
        builder = builder.max_workers(workers);
    }
    Ok(builder.build()?)
}

/// Runs a many-body expansion truncated at `config.truncation`.
#[instrument(skip_all, name = "mbe_workflow", fields(truncation = config.truncation))]
pub fn run(
    system: &MolecularSystem,
    config: &MbeConfig,
    order: usize,
    context: &MimContext,
) -> Result<MimResult, EngineError> {
    let mim_config = plan(system, config, context)?;
    info!(
        fragmentizer = %mim_config.fragmentizer,
        terms = mim_config.task_count(),
        "Expansion planned."
    );
    mim::run(system, &mim_config, order, context)
}
