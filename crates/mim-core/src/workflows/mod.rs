//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **MIM** ([`mim`]) - Fragments a system with the configured policy, runs one task per
//!   weight and accumulates the weighted results into a whole-system derivative.
//! - **MBE** ([`mbe`]) - Builds a truncated many-body expansion over the monomers of a
//!   scheme, generating the n-mer fragments and their coefficients, then runs MIM.
//!
//! Both workflows take their collaborators (method provider, fragmentation provider,
//! result reporter, progress reporter) through a [`mim::MimContext`] and keep no state
//! between invocations.

pub mod mbe;
pub mod mim;
