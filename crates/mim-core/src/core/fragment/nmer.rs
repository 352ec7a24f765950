use super::key::FragmenterKey;
use super::schemes::MonomerScheme;
use super::{FragmentError, Fragmenter};
use crate::core::models::system::MolecularSystem;
use crate::core::models::system_map::SystemMap;
use itertools::Itertools;
use tracing::debug;

/// Enumerates the monomer index sets of an n-mer expansion.
///
/// Yields every combination of `1..=truncation` monomers out of `monomers`, ordered by
/// increasing body count and then lexicographically.
pub fn nmer_members(monomers: usize, truncation: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=truncation).flat_map(move |k| (0..monomers).combinations(k))
}

/// Formats the subsystem name of an n-mer, e.g. `(0,2)`.
pub fn nmer_name(members: &[usize]) -> String {
    format!("({})", members.iter().join(","))
}

/// Fragments a system into monomers by a [`MonomerScheme`] and, optionally, expands
/// them into all n-mers up to a truncation order.
#[derive(Debug, Clone, Copy)]
pub struct NMerFragmenter {
    scheme: MonomerScheme,
    truncation: Option<usize>,
}

impl NMerFragmenter {
    pub fn new(scheme: MonomerScheme, truncation: Option<usize>) -> Self {
        Self { scheme, truncation }
    }
}

impl Fragmenter for NMerFragmenter {
    fn name(&self) -> String {
        FragmenterKey {
            scheme: self.scheme,
            truncation: self.truncation,
        }
        .to_string()
    }

    fn fragmentize(&self, system: &MolecularSystem) -> Result<SystemMap, FragmentError> {
        let monomers = self.scheme.monomers(system);
        if monomers.is_empty() {
            return Err(FragmentError::Empty { policy: self.name() });
        }

        let truncation = self.truncation.unwrap_or(1);
        if truncation > monomers.len() {
            return Err(FragmentError::TruncationTooLarge {
                policy: self.name(),
                order: truncation,
                monomers: monomers.len(),
            });
        }

        let mut map = SystemMap::new();
        if self.scheme == MonomerScheme::Null {
            map.insert("system", system.clone())?;
            return Ok(map);
        }

        for members in nmer_members(monomers.len(), truncation) {
            let ids: Vec<_> = members
                .iter()
                .flat_map(|&m| monomers[m].iter().copied())
                .collect();
            map.insert(nmer_name(&members), system.subsystem(&ids)?)?;
        }

        debug!(
            policy = %self.name(),
            monomers = monomers.len(),
            subsystems = map.len(),
            "Fragmentation finished."
        );
        Ok(map)
    }
}
