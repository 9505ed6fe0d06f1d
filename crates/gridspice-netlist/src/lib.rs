//! SPICE netlist generation for Gridspice.
//!
//! Compiles an assembled [`gridspice_core::Circuit`] into device-level
//! netlist text plus a simulation control block.

mod codegen;

pub use codegen::{generate, SpiceOptions, SpiceOutput};
