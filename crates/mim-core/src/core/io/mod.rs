//! Input/output for molecular geometries and engine results.
//!
//! - [`traits`] - A common trait for reading and writing molecular file formats
//! - [`xyz`] - The XYZ geometry format, with optional charge/multiplicity in the comment line
//! - [`derivative`] - CSV export of accumulated whole-system derivatives

pub mod derivative;
pub mod traits;
pub mod xyz;
