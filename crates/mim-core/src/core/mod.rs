//! # Core Module
//!
//! Fundamental building blocks consumed by the MIM engine.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, elements, systems and named subsystem maps
//! - **File I/O** ([`io`]) - Reading XYZ geometries and exporting accumulated derivatives
//! - **Fragmentation** ([`fragment`]) - Policies that partition a system into named subsystems
//! - **Methods** ([`methods`]) - The derivative capability interface and bundled backends
//!
//! Nothing in this module holds state across computations; every value is built for one
//! invocation of the engine and dropped afterwards.

pub mod fragment;
pub mod io;
pub mod methods;
pub mod models;
