//! # Gridspice
//!
//! Random, structurally-valid circuit topologies synthesized on a grid and
//! compiled into SPICE netlists.
//!
//! The pipeline runs strictly downward: sample a grid of candidate
//! component placements, enforce the global circuit rules, resolve
//! connectivity into electrical nodes, assemble the ordered branch list,
//! and emit device-level netlist text.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridspice::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = GenConfig::default();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let mut grid = sample_grid(&config, &mut rng).unwrap();
//! enforce(&mut grid, &config, &mut rng);
//! if let Ok(circuit) = Circuit::build(grid, &BuildOptions::default()) {
//!     let spice = generate(&circuit, &SpiceOptions::default());
//!     assert!(spice.text.ends_with(".end\n"));
//! }
//! ```

// Re-export member crates
pub use gridspice_core as core;
pub use gridspice_gen as gen;
pub use gridspice_netlist as netlist;

// ============================================================================
// Convenient re-exports from gridspice_core
// ============================================================================

pub use gridspice_core::{
    AnalysisKind,
    Branch,
    BuildOptions,
    // Circuit representation
    Circuit,
    CircuitStats,
    ComponentType,
    Edge,
    EdgeRef,
    // Grid model
    Grid,
    // Errors
    InvalidCircuit,
    Measure,
    NodeId,
    NodeMap,
    OpAmpRole,
    Orientation,
    ValueUnit,
};

// ============================================================================
// Convenient re-exports from gridspice_gen
// ============================================================================

pub use gridspice_gen::{enforce, sample_grid, Error as GenError, GenConfig};

// ============================================================================
// Convenient re-exports from gridspice_netlist
// ============================================================================

pub use gridspice_netlist::{generate, SpiceOptions, SpiceOutput};

/// Prelude module containing commonly used types and functions.
///
/// ```rust
/// use gridspice::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        enforce, generate, sample_grid, AnalysisKind, Branch, BuildOptions, Circuit,
        CircuitStats, ComponentType, Edge, EdgeRef, GenConfig, Grid, InvalidCircuit, Measure,
        NodeId, SpiceOptions, SpiceOutput,
    };
}
