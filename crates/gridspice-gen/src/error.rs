//! Error types for gridspice-gen.
//!
//! Everything here is a configuration-level hard failure. Structurally bad
//! samples never surface as errors; the sampler resamples them internally
//! and invalid circuits are reported by `gridspice-core` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("grid size distribution is empty or has zero total weight")]
    EmptyGridSizes,

    #[error("{table} component table has zero total weight")]
    EmptyComponentTable { table: &'static str },

    #[error("value range for {kind} is empty")]
    EmptyValueRange { kind: String },

    #[error("no admissible sample after {attempts} attempts; the configured distributions cannot satisfy the dependent-source band")]
    SampleSpaceExhausted { attempts: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
