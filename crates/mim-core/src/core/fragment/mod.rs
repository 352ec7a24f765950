//! Fragmentation policies.
//!
//! A [`Fragmenter`] partitions a whole system into named subsystems. The engine treats
//! fragmenters as opaque: it only relies on the shape of the returned [`SystemMap`]
//! (non-empty, unique names, atoms drawn from the whole system).
//!
//! Policies are selected by a key resolved through a [`FragmenterProvider`]. The
//! [`StandardFragmenters`] provider understands keys of the form `scheme` or
//! `scheme@n`, where `scheme` is one of `null`, `atomic` or `bonded` and `n` truncates
//! an n-mer expansion of the scheme's monomers (see [`key::FragmenterKey`]).

pub mod key;
pub mod nmer;
pub mod schemes;

use crate::core::models::system::{MolecularSystem, UnknownAtomError};
use crate::core::models::system_map::{DuplicateNameError, SystemMap};
use key::FragmenterKey;
use nmer::NMerFragmenter;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("Unknown fragmentation scheme '{0}'. Expected 'null', 'atomic' or 'bonded'.")]
    UnknownScheme(String),

    #[error("Invalid fragmentizer key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Fragmentation '{policy}' produced no subsystems")]
    Empty { policy: String },

    #[error("Truncation order {order} exceeds the {monomers} monomer(s) produced by '{policy}'")]
    TruncationTooLarge {
        policy: String,
        order: usize,
        monomers: usize,
    },

    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),

    #[error(transparent)]
    UnknownAtom(#[from] UnknownAtomError),
}

/// Partitions a whole system into named subsystems.
pub trait Fragmenter: Send + Sync {
    /// The key this fragmenter was resolved from, used in diagnostics.
    fn name(&self) -> String;

    /// Splits `system` into named subsystems.
    ///
    /// Names must be unique and stable for a given system; the map's insertion order
    /// defines task submission order.
    fn fragmentize(&self, system: &MolecularSystem) -> Result<SystemMap, FragmentError>;
}

/// Resolves fragmentation policy keys into fragmenters.
pub trait FragmenterProvider: Send + Sync {
    fn resolve(&self, key: &str) -> Result<Box<dyn Fragmenter>, FragmentError>;
}

/// Provider for the built-in schemes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFragmenters;

impl FragmenterProvider for StandardFragmenters {
    fn resolve(&self, key: &str) -> Result<Box<dyn Fragmenter>, FragmentError> {
        let parsed: FragmenterKey = key.parse()?;
        Ok(Box::new(NMerFragmenter::new(parsed.scheme, parsed.truncation)))
    }
}
