//! # Engine Module
//!
//! The MIM engine: it turns a fragmented system and a coefficient vector into a single
//! whole-system derivative tensor.
//!
//! ## Overview
//!
//! A computation runs in four strictly ordered stages. Tasks are generated from the
//! configured method, basis and weight lists by the broadcast rule; the whole batch is
//! submitted to a scheduler that owns a fixed-size worker pool; results are collected in
//! submission order; finally every result is folded, sequentially, into the global tensor
//! through atom index translation.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated option sets and their builders
//! - **Atom Index Maps** ([`atom_map`]) - Identity to position tables, built once per system
//! - **Tasks** ([`task`]) - Self-contained computation units and the broadcast rule
//! - **Scheduling** ([`scheduler`]) - A per-computation worker pool with ordered retrieval
//! - **Accumulation** ([`accumulator`]) - Coefficient weighting and re-indexing into the global tensor
//! - **Reporting** ([`report`]) - The tabular result interface and the per-fragment derivative map
//! - **Progress Monitoring** ([`progress`]) - Phase and task progress callbacks
//! - **Error Handling** ([`error`]) - Fatal engine errors identifying the failing task or precondition

pub mod accumulator;
pub mod atom_map;
pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod task;
