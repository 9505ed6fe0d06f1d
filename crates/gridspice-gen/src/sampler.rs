//! Stochastic grid topology sampling.
//!
//! Proposes raw edge arrays only; no circuit-level validity checking
//! happens here. Structural bounds that the sampler itself owns (the
//! dependent-source band, control-measurement feasibility) are enforced by
//! silent resampling.

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use gridspice_core::{ComponentType, EdgeRef, Grid, Measure, Orientation, ValueUnit};

use crate::config::GenConfig;
use crate::error::{Error, Result};

const MEASURES: [Measure; 3] = [Measure::None, Measure::Voltage, Measure::Current];

/// Draw a complete candidate grid from the configured distributions.
///
/// # Errors
///
/// Only configuration-level failures escalate: empty distributions, or a
/// sample space that cannot satisfy the dependent-source band within the
/// attempt ceiling.
pub fn sample_grid(config: &GenConfig, rng: &mut impl Rng) -> Result<Grid> {
    config.validate()?;

    let size_dist = WeightedIndex::new(config.grid_sizes.iter().map(|&(_, w)| w))
        .map_err(|_| Error::EmptyGridSizes)?;
    let interior_dist = WeightedIndex::new(config.interior.iter().map(|&(_, w)| w))
        .map_err(|_| Error::EmptyComponentTable { table: "interior" })?;
    let border_dist = WeightedIndex::new(config.border.iter().map(|&(_, w)| w))
        .map_err(|_| Error::EmptyComponentTable { table: "border" })?;
    let measure_dist = WeightedIndex::new(config.measure_weights)
        .map_err(|_| Error::EmptyComponentTable { table: "measure" })?;

    let m = config.grid_sizes[size_dist.sample(rng)].0;
    // At most one dimension of 4: the drawable area caps at 4xn.
    let n = if m == 4 {
        let reduced: Vec<(usize, u32)> = config
            .grid_sizes
            .iter()
            .copied()
            .filter(|&(size, _)| size != 4)
            .collect();
        let dist = WeightedIndex::new(reduced.iter().map(|&(_, w)| w))
            .map_err(|_| Error::EmptyGridSizes)?;
        reduced[dist.sample(rng)].0
    } else {
        config.grid_sizes[size_dist.sample(rng)].0
    };

    let rows: Vec<f64> = (0..m)
        .map(|i| i as f64 * config.pitch + rng.gen_range(-config.jitter..=config.jitter))
        .collect();
    let cols: Vec<f64> = (0..n)
        .map(|j| j as f64 * config.pitch + rng.gen_range(-config.jitter..=config.jitter))
        .collect();

    for _ in 0..config.max_sample_attempts {
        let mut grid = Grid::new(m, n);
        grid.set_coordinates(rows.clone(), cols.clone());
        let refs: Vec<EdgeRef> = grid.scan_refs().collect();

        let mut labels: HashMap<ComponentType, u32> = HashMap::new();
        let mut voltage_meas = 0usize;
        let mut current_meas = 0usize;
        let mut voltage_controlled = 0usize;
        let mut current_controlled = 0usize;
        let mut reactive = false;

        for r in refs {
            let border = match r.orientation {
                Orientation::Vertical => r.j == 0 || r.j == n - 1,
                Orientation::Horizontal => r.i == 0 || r.i == m - 1,
            };
            let kind = if border {
                config.border[border_dist.sample(rng)].0
            } else {
                config.interior[interior_dist.sample(rng)].0
            };
            if kind == ComponentType::Open {
                // The slot stays absent.
                continue;
            }

            let value = rng.gen_range(config.value_range(kind));
            let unit = config
                .units
                .choose(rng)
                .copied()
                .unwrap_or(ValueUnit::One);
            let counter = labels.entry(kind).or_insert(0);
            *counter += 1;

            let edge = grid.edge_mut(r);
            edge.present = true;
            edge.kind = kind;
            edge.value = value;
            edge.unit = unit;
            edge.label = *counter;
            edge.direction = rng.gen_bool(0.5);
            edge.measure_direction = rng.gen_bool(0.5);

            match kind.control_kind() {
                Some(Measure::Voltage) => voltage_controlled += 1,
                Some(Measure::Current) => current_controlled += 1,
                _ => {}
            }

            // Dependent sources never probe themselves; their binding is
            // chosen by the enforcer once labels are final.
            if !kind.is_dependent() {
                let measure = MEASURES[measure_dist.sample(rng)];
                if measure != Measure::None {
                    edge.measure = measure;
                    edge.measure_label = rng.gen_range(config.measure_labels.clone());
                    match measure {
                        Measure::Voltage => voltage_meas += 1,
                        Measure::Current => current_meas += 1,
                        Measure::None => unreachable!(),
                    }
                }
            }

            if kind.is_reactive() {
                reactive = true;
            }
        }

        let dependents = voltage_controlled + current_controlled;
        if !config.dependent_band.contains(&dependents) {
            continue;
        }
        if (voltage_controlled > 0 && voltage_meas == 0)
            || (current_controlled > 0 && current_meas == 0)
        {
            continue;
        }

        if config.rlc && !reactive {
            promote_reactive(&mut grid, config, rng);
        }

        return Ok(grid);
    }

    Err(Error::SampleSpaceExhausted {
        attempts: config.max_sample_attempts,
    })
}

/// Turn one random resistor into a capacitor or inductor so RLC mode has
/// something to sweep.
fn promote_reactive(grid: &mut Grid, config: &GenConfig, rng: &mut impl Rng) {
    let candidates: Vec<EdgeRef> = grid
        .scan_refs()
        .filter(|&r| {
            let edge = grid.edge(r);
            edge.present && edge.kind == ComponentType::Resistor
        })
        .collect();
    if let Some(&r) = candidates.choose(rng) {
        let kind = if rng.gen_bool(0.5) {
            ComponentType::Capacitor
        } else {
            ComponentType::Inductor
        };
        let value = rng.gen_range(config.value_range(kind));
        let edge = grid.edge_mut(r);
        edge.kind = kind;
        edge.value = value;
    }
}
