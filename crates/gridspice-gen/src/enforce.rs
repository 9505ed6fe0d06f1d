//! Circuit-level constraint enforcement.
//!
//! Sequential rewrites over the full edge arrays, each a total pass in scan
//! order (vertical slots row-major, then horizontal). Order matters: labels
//! are renumbered after every kind rewrite, and dependent-source bindings
//! are chosen only once all relabeling is done.

use rand::seq::SliceRandom;
use rand::Rng;

use gridspice_core::{ComponentType, EdgeRef, Grid, Measure};

use crate::config::GenConfig;

/// Apply every enforcement pass to a sampled grid.
pub fn enforce(grid: &mut Grid, config: &GenConfig, rng: &mut impl Rng) {
    convert_current_sources(grid, config, rng);
    enforce_single_voltage_source(grid, config, rng);
    relabel(grid);
    if config.integrator {
        enforce_single_integrator(grid, config, rng);
        relabel(grid);
    }
    if config.rlc {
        strip_source_measurements(grid);
    }
    bind_controls(grid, rng);
}

/// Current sources are only a sampling intermediate; the structural
/// generator emits none. Each becomes a resistor with a fresh value.
fn convert_current_sources(grid: &mut Grid, config: &GenConfig, rng: &mut impl Rng) {
    let refs: Vec<EdgeRef> = grid.scan_refs().collect();
    for r in refs {
        if grid.edge(r).kind == ComponentType::CurrentSource {
            let value = rng.gen_range(config.value_range(ComponentType::Resistor));
            let edge = grid.edge_mut(r);
            edge.kind = ComponentType::Resistor;
            edge.value = value;
        }
    }
}

/// Exactly one voltage source: promote a random present edge when none was
/// sampled, demote everything after the first when several were.
fn enforce_single_voltage_source(grid: &mut Grid, config: &GenConfig, rng: &mut impl Rng) {
    let sources: Vec<EdgeRef> = grid
        .scan_refs()
        .filter(|&r| {
            let edge = grid.edge(r);
            edge.present && edge.kind == ComponentType::VoltageSource
        })
        .collect();

    if sources.is_empty() {
        let candidates: Vec<EdgeRef> = grid
            .scan_refs()
            .filter(|&r| grid.edge(r).present)
            .collect();
        if let Some(&r) = candidates.choose(rng) {
            let value = rng.gen_range(config.value_range(ComponentType::VoltageSource));
            let edge = grid.edge_mut(r);
            edge.kind = ComponentType::VoltageSource;
            edge.value = value;
        }
    } else {
        for &r in &sources[1..] {
            let value = rng.gen_range(config.value_range(ComponentType::Resistor));
            let edge = grid.edge_mut(r);
            edge.kind = ComponentType::Resistor;
            edge.value = value;
        }
    }
}

/// Renumber per-type labels densely from 1 in scan order. Shorts and opens
/// carry no label.
fn relabel(grid: &mut Grid) {
    let mut counters: std::collections::HashMap<ComponentType, u32> =
        std::collections::HashMap::new();
    let refs: Vec<EdgeRef> = grid.scan_refs().collect();
    for r in refs {
        let edge = grid.edge(r);
        if !edge.present || !edge.kind.is_labeled() {
            continue;
        }
        let counter = counters.entry(edge.kind).or_insert(0);
        *counter += 1;
        let label = *counter;
        grid.edge_mut(r).label = label;
    }
}

/// Exactly one integrator, promoted from / demoted to resistors.
fn enforce_single_integrator(grid: &mut Grid, config: &GenConfig, rng: &mut impl Rng) {
    let integrators: Vec<EdgeRef> = grid
        .scan_refs()
        .filter(|&r| {
            let edge = grid.edge(r);
            edge.present && edge.kind == ComponentType::INTEGRATOR
        })
        .collect();

    if integrators.is_empty() {
        let candidates: Vec<EdgeRef> = grid
            .scan_refs()
            .filter(|&r| {
                let edge = grid.edge(r);
                edge.present && edge.kind == ComponentType::Resistor
            })
            .collect();
        if let Some(&r) = candidates.choose(rng) {
            let value = rng.gen_range(config.value_range(ComponentType::Resistor));
            let edge = grid.edge_mut(r);
            edge.kind = ComponentType::INTEGRATOR;
            edge.value = value;
        }
    } else {
        for &r in &integrators[1..] {
            let value = rng.gen_range(config.value_range(ComponentType::Resistor));
            let edge = grid.edge_mut(r);
            edge.kind = ComponentType::Resistor;
            edge.value = value;
        }
    }
}

/// RLC mode: the stimulus source carries no measurement request.
fn strip_source_measurements(grid: &mut Grid) {
    let refs: Vec<EdgeRef> = grid.scan_refs().collect();
    for r in refs {
        let edge = grid.edge_mut(r);
        if edge.present && edge.kind == ComponentType::VoltageSource {
            edge.measure = Measure::None;
            edge.measure_label = -1;
        }
    }
}

/// Bind every dependent source to a uniformly random measurement label of
/// the kind it needs. Runs after all relabeling; measurement labels are
/// untouched by the passes above, so the pools are final here.
fn bind_controls(grid: &mut Grid, rng: &mut impl Rng) {
    let mut voltage_labels = Vec::new();
    let mut current_labels = Vec::new();
    for r in grid.scan_refs() {
        let edge = grid.edge(r);
        if !edge.present {
            continue;
        }
        match edge.measure {
            Measure::Voltage => voltage_labels.push(edge.measure_label),
            Measure::Current => current_labels.push(edge.measure_label),
            Measure::None => {}
        }
    }

    let refs: Vec<EdgeRef> = grid.scan_refs().collect();
    for r in refs {
        let edge = grid.edge(r);
        if !edge.present {
            continue;
        }
        let pool = match edge.kind.control_kind() {
            Some(Measure::Voltage) => &voltage_labels,
            Some(Measure::Current) => &current_labels,
            _ => continue,
        };
        if let Some(&label) = pool.choose(rng) {
            grid.edge_mut(r).control_label = label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridspice_core::Edge;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    fn count_kind(grid: &Grid, kind: ComponentType) -> usize {
        grid.scan_refs()
            .filter(|&r| {
                let edge = grid.edge(r);
                edge.present && edge.kind == kind
            })
            .count()
    }

    /// 2x3 grid fully ringed with resistors.
    fn resistor_grid() -> Grid {
        let mut grid = Grid::new(2, 3);
        let refs: Vec<EdgeRef> = grid.scan_refs().collect();
        for r in refs {
            *grid.edge_mut(r) = Edge::component(ComponentType::Resistor, 10);
        }
        grid
    }

    #[test]
    fn test_missing_voltage_source_promoted() {
        let mut grid = resistor_grid();
        enforce(&mut grid, &GenConfig::default(), &mut rng());
        assert_eq!(count_kind(&grid, ComponentType::VoltageSource), 1);
    }

    #[test]
    fn test_extra_voltage_sources_demoted_keeping_first() {
        let mut grid = resistor_grid();
        grid.edge_mut(EdgeRef::vertical(0, 0)).kind = ComponentType::VoltageSource;
        grid.edge_mut(EdgeRef::horizontal(1, 1)).kind = ComponentType::VoltageSource;
        enforce(&mut grid, &GenConfig::default(), &mut rng());
        assert_eq!(count_kind(&grid, ComponentType::VoltageSource), 1);
        assert_eq!(
            grid.vertical(0, 0).kind,
            ComponentType::VoltageSource,
            "first source in scan order survives"
        );
        assert_eq!(grid.horizontal(1, 1).kind, ComponentType::Resistor);
    }

    #[test]
    fn test_current_sources_become_resistors() {
        let mut grid = resistor_grid();
        grid.edge_mut(EdgeRef::vertical(0, 1)).kind = ComponentType::CurrentSource;
        grid.edge_mut(EdgeRef::horizontal(0, 0)).kind = ComponentType::CurrentSource;
        enforce(&mut grid, &GenConfig::default(), &mut rng());
        assert_eq!(count_kind(&grid, ComponentType::CurrentSource), 0);
    }

    #[test]
    fn test_labels_dense_per_type_after_enforcement() {
        let mut grid = resistor_grid();
        enforce(&mut grid, &GenConfig::default(), &mut rng());
        let mut resistor_labels: Vec<u32> = grid
            .scan_refs()
            .filter(|&r| {
                let edge = grid.edge(r);
                edge.present && edge.kind == ComponentType::Resistor
            })
            .map(|r| grid.edge(r).label)
            .collect();
        resistor_labels.sort_unstable();
        let expected: Vec<u32> = (1..=resistor_labels.len() as u32).collect();
        assert_eq!(resistor_labels, expected);
    }

    #[test]
    fn test_integrator_mode_yields_exactly_one() {
        let config = GenConfig {
            integrator: true,
            ..GenConfig::default()
        };
        let mut grid = resistor_grid();
        enforce(&mut grid, &config, &mut rng());
        assert_eq!(count_kind(&grid, ComponentType::INTEGRATOR), 1);

        // And demotion when a grid starts with several.
        let mut grid = resistor_grid();
        grid.edge_mut(EdgeRef::vertical(0, 0)).kind = ComponentType::INTEGRATOR;
        grid.edge_mut(EdgeRef::vertical(0, 2)).kind = ComponentType::INTEGRATOR;
        enforce(&mut grid, &config, &mut rng());
        assert_eq!(count_kind(&grid, ComponentType::INTEGRATOR), 1);
    }

    #[test]
    fn test_controls_bound_to_existing_labels() {
        let mut grid = resistor_grid();
        // Fix the voltage source up front so promotion cannot touch the
        // probe or the dependent source.
        grid.edge_mut(EdgeRef::vertical(0, 0)).kind = ComponentType::VoltageSource;
        let probe = grid.edge_mut(EdgeRef::horizontal(0, 1));
        probe.measure = Measure::Current;
        probe.measure_label = 4;
        grid.edge_mut(EdgeRef::vertical(0, 2)).kind = ComponentType::Cccs;
        enforce(&mut grid, &GenConfig::default(), &mut rng());
        assert_eq!(grid.vertical(0, 2).control_label, 4);
    }

    #[test]
    fn test_unbindable_control_left_unset() {
        let mut grid = resistor_grid();
        grid.edge_mut(EdgeRef::vertical(0, 0)).kind = ComponentType::VoltageSource;
        grid.edge_mut(EdgeRef::vertical(0, 2)).kind = ComponentType::Vcvs;
        enforce(&mut grid, &GenConfig::default(), &mut rng());
        // No voltage measurement exists anywhere; the binding stays -1 and
        // circuit construction rejects it downstream.
        assert_eq!(grid.vertical(0, 2).control_label, -1);
    }

    #[test]
    fn test_rlc_strips_source_probes() {
        let config = GenConfig {
            rlc: true,
            ..GenConfig::default()
        };
        let mut grid = resistor_grid();
        let source = grid.edge_mut(EdgeRef::vertical(0, 0));
        source.kind = ComponentType::VoltageSource;
        source.measure = Measure::Voltage;
        source.measure_label = 2;
        enforce(&mut grid, &config, &mut rng());
        assert_eq!(grid.vertical(0, 0).measure, Measure::None);
        assert_eq!(grid.vertical(0, 0).measure_label, -1);
    }
}
