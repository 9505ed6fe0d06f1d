//! Core circuit representation for Gridspice.
//!
//! This crate provides the fundamental data structures for grid-synthesized
//! circuits: the junction grid with its candidate edges, the component
//! taxonomy, electrical node resolution, and the branch-level circuit that
//! the netlist and diagram backends consume.

pub mod branch;
pub mod circuit;
pub mod component;
pub mod error;
pub mod grid;
pub mod node;
pub mod resolve;
pub mod stats;
pub mod units;

pub use branch::{Branch, Measure};
pub use circuit::{AnalysisKind, BuildOptions, Circuit};
pub use component::{ComponentType, OpAmpRole};
pub use error::{InvalidCircuit, Result};
pub use grid::{Edge, EdgeRef, Grid, Orientation};
pub use node::NodeId;
pub use resolve::NodeMap;
pub use stats::CircuitStats;
pub use units::ValueUnit;
