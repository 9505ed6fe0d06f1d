//! Stochastic circuit generation for Gridspice.
//!
//! Sampling proposes a grid of candidate component placements from weighted
//! distributions; enforcement rewrites the proposal until the global
//! circuit-level rules hold (exactly one voltage source, dense labels,
//! bound dependent sources). Validation itself lives in `gridspice-core`.

pub mod config;
pub mod enforce;
pub mod error;
pub mod sampler;

pub use config::GenConfig;
pub use enforce::enforce;
pub use error::{Error, Result};
pub use sampler::sample_grid;
