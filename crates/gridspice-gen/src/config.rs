//! Generation configuration: distributions, value ranges, and mode flags.

use std::ops::{Range, RangeInclusive};

use gridspice_core::{ComponentType, ValueUnit};

use crate::error::{Error, Result};

/// Weighted discrete distribution, stored as `(item, weight)` pairs.
pub type WeightTable<T> = Vec<(T, u32)>;

/// Everything the sampler and enforcer draw from.
///
/// The defaults reproduce the production tables: borders favor simpler,
/// resistive components and are never open, interiors carry the full
/// variety including dependent sources.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Distribution both grid dimensions are drawn from.
    pub grid_sizes: WeightTable<usize>,
    /// Component kinds for interior edge slots.
    pub interior: WeightTable<ComponentType>,
    /// Component kinds for border edge slots (outer columns of vertical
    /// edges, outer rows of horizontal edges).
    pub border: WeightTable<ComponentType>,
    /// Half-open value range used by most component kinds.
    pub value_min: u32,
    pub value_max: u32,
    /// Units a value may be tagged with.
    pub units: Vec<ValueUnit>,
    /// Weights for `[no measurement, voltage, current]`.
    pub measure_weights: [u32; 3],
    /// Labels measurement requests draw from (-1 means unlabeled).
    pub measure_labels: RangeInclusive<i32>,
    /// Admissible total of dependent-source edges per sample; proposals
    /// outside the band are resampled.
    pub dependent_band: RangeInclusive<usize>,
    /// Mean spacing between junction rows/columns in drawing coordinates.
    pub pitch: f64,
    /// Uniform jitter applied to each drawing coordinate.
    pub jitter: f64,
    /// Resample ceiling before the sample space is declared exhausted.
    pub max_sample_attempts: usize,
    /// Emit symbolic component names instead of numeric values.
    pub symbolic: bool,
    /// Guarantee exactly one integrator op-amp per circuit.
    pub integrator: bool,
    /// Smaller grids for faster downstream analysis.
    pub simple_circuits: bool,
    /// Guarantee at least one reactive component and force AC analysis.
    pub rlc: bool,
    /// Hide probe drawings except those controlling dependent sources.
    /// Consumed by the diagram backend; recorded here for completeness.
    pub no_meas: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            grid_sizes: vec![(2, 6), (3, 8), (4, 2)],
            interior: vec![
                (ComponentType::Short, 12),
                (ComponentType::VoltageSource, 4),
                (ComponentType::Resistor, 15),
                (ComponentType::Capacitor, 6),
                (ComponentType::Inductor, 5),
                (ComponentType::Open, 8),
                (ComponentType::Vccs, 1),
                (ComponentType::Vcvs, 4),
                (ComponentType::Cccs, 3),
                (ComponentType::Ccvs, 4),
            ],
            border: vec![
                (ComponentType::Short, 10),
                (ComponentType::VoltageSource, 4),
                (ComponentType::Resistor, 10),
                (ComponentType::Capacitor, 1),
                (ComponentType::Inductor, 1),
                (ComponentType::Vccs, 3),
                (ComponentType::Vcvs, 3),
                (ComponentType::Cccs, 2),
                (ComponentType::Ccvs, 1),
            ],
            value_min: 1,
            value_max: 100,
            units: vec![ValueUnit::One],
            measure_weights: [20, 1, 1],
            measure_labels: -1..=9,
            dependent_band: 1..=2,
            pitch: 4.0,
            jitter: 0.4,
            max_sample_attempts: 1000,
            symbolic: false,
            integrator: false,
            simple_circuits: false,
            rlc: false,
            no_meas: false,
        }
    }
}

impl GenConfig {
    /// The reduced-variety configuration behind the `simple_circuits` flag:
    /// smaller grids, otherwise the standard tables.
    pub fn simple() -> Self {
        GenConfig {
            grid_sizes: vec![(2, 8), (3, 6), (4, 1)],
            simple_circuits: true,
            ..GenConfig::default()
        }
    }

    /// Value range for a component kind.
    pub fn value_range(&self, kind: ComponentType) -> Range<u32> {
        match kind {
            // Transconductance values sit higher than passives.
            ComponentType::BjtSmallSignal => self.value_min.max(10)..self.value_max,
            _ => self.value_min..self.value_max,
        }
    }

    /// Reject configurations no sample can ever satisfy. This is the one
    /// hard failure in the generation pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.grid_sizes.iter().all(|&(_, w)| w == 0) {
            return Err(Error::EmptyGridSizes);
        }
        // A 4 on the first draw excludes 4 from the second, so some other
        // size must carry weight.
        if self.grid_sizes.iter().all(|&(s, w)| s == 4 || w == 0) {
            return Err(Error::EmptyGridSizes);
        }
        if self.interior.iter().all(|&(_, w)| w == 0) {
            return Err(Error::EmptyComponentTable { table: "interior" });
        }
        if self.border.iter().all(|&(_, w)| w == 0) {
            return Err(Error::EmptyComponentTable { table: "border" });
        }
        if self.value_min >= self.value_max {
            return Err(Error::EmptyValueRange {
                kind: "all".to_string(),
            });
        }
        Ok(())
    }
}
