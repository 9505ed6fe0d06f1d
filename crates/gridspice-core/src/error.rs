//! Error types for gridspice-core.

use thiserror::Error;

use crate::branch::Measure;
use crate::component::ComponentType;

/// Why a constructed circuit was rejected.
///
/// Every variant is recoverable from the caller's point of view: the
/// generation driver discards the sample and retries with a fresh one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCircuit {
    #[error("junction ({i}, {j}) has exactly one incident edge")]
    DanglingJunction { i: usize, j: usize },

    #[error("{kind} edge closes on a single node; only shorts may do that")]
    ImplicitShort { kind: ComponentType },

    #[error("a {kind} cannot carry a {measure} measurement")]
    MeasureConflict { kind: ComponentType, measure: Measure },

    #[error("control label {label} matches {found} {kind} measurements, expected exactly 1")]
    UnboundControl {
        label: i32,
        kind: Measure,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, InvalidCircuit>;
