//! # MIM++ Core Library
//!
//! A many-body expansion engine for molecular properties. A large system is split into
//! subsystems, each subsystem's energy derivative is computed independently, and the
//! results are recombined with expansion coefficients into a whole-system derivative.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`, `SystemMap`),
//!   element data, molecular file I/O, fragmentation policies, and the method capability
//!   interface together with a few self-contained method backends.
//!
//! - **[`engine`]: The Logic Core.** Task generation, the parallel task scheduler, atom
//!   index maps, and the derivative accumulator that folds fragment results into the
//!   whole-system tensor.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures (`mim`, `mbe`) that tie the
//!   engine and core together behind a single entry point.

pub mod core;
pub mod engine;
pub mod workflows;
