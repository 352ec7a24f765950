//! # Core Models Module
//!
//! Data structures used to describe the molecular systems handed to the engine.
//!
//! - [`ids`] - Stable atom identities shared between a system and its subsystems
//! - [`element`] - Periodic table data (atomic numbers, covalent radii)
//! - [`atom`] - A single atom with its element, position and ghost flag
//! - [`system`] - An ordered collection of atoms with charge and multiplicity
//! - [`system_map`] - Insertion-ordered map of named subsystems
//!
//! ## Usage
//!
//! ```ignore
//! use mimpp::core::models::{element::Element, system::MolecularSystem};
//! use nalgebra::Point3;
//!
//! let mut system = MolecularSystem::new();
//! let o = system.add_atom(Element::from_symbol("O").unwrap(), Point3::origin());
//! let sub = system.subsystem(&[o]).unwrap();
//! ```

pub mod atom;
pub mod element;
pub mod ids;
pub mod system;
pub mod system_map;
