use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an atom, preserved when the atom is copied into a subsystem.
///
/// Two atoms with the same `AtomId` are the same physical atom, regardless of which
/// system they were read from or whether one of them is a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomId(pub usize);

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
