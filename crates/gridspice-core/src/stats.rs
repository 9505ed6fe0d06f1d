//! Per-circuit summary statistics.

use serde::{Deserialize, Serialize};

use crate::branch::{Branch, Measure};
use crate::component::{ComponentType, OpAmpRole};

/// Counts of nodes, branches, and component/measurement kinds for one
/// circuit. Serialized verbatim into the dataset record; the field names
/// are part of the output contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub num_nodes: usize,
    pub num_branches: usize,
    pub num_resistors: usize,
    pub num_capacitors: usize,
    pub num_inductors: usize,
    pub num_voltage_sources: usize,
    pub num_current_sources: usize,
    pub num_controlled_sources: usize,
    pub num_shorts: usize,
    /// Voltage probes on resistor branches.
    pub num_voltage_measurements: usize,
    /// Current probes on resistor branches.
    pub num_current_measurements: usize,
    pub num_opamps: usize,
    pub num_opamp_inverting: usize,
    pub num_opamp_noninverting: usize,
    pub num_opamp_buffer: usize,
    pub num_opamp_integrator: usize,
    pub num_opamp_differentiator: usize,
    pub num_opamp_summing: usize,
}

impl CircuitStats {
    /// Tally a final branch list.
    pub fn collect(num_nodes: usize, branches: &[Branch]) -> Self {
        let mut stats = CircuitStats {
            num_nodes,
            num_branches: branches.len(),
            ..CircuitStats::default()
        };
        for branch in branches {
            match branch.kind {
                ComponentType::Resistor => {
                    stats.num_resistors += 1;
                    match branch.measure {
                        Measure::Voltage => stats.num_voltage_measurements += 1,
                        Measure::Current => stats.num_current_measurements += 1,
                        Measure::None => {}
                    }
                }
                ComponentType::Capacitor => stats.num_capacitors += 1,
                ComponentType::Inductor => stats.num_inductors += 1,
                ComponentType::VoltageSource => stats.num_voltage_sources += 1,
                ComponentType::CurrentSource => stats.num_current_sources += 1,
                ComponentType::Short => stats.num_shorts += 1,
                ComponentType::Vccs
                | ComponentType::Vcvs
                | ComponentType::Cccs
                | ComponentType::Ccvs => stats.num_controlled_sources += 1,
                ComponentType::OpAmp(role) => {
                    stats.num_opamps += 1;
                    match role {
                        OpAmpRole::Inverting => stats.num_opamp_inverting += 1,
                        OpAmpRole::NonInverting => stats.num_opamp_noninverting += 1,
                        OpAmpRole::Buffer => stats.num_opamp_buffer += 1,
                        OpAmpRole::Integrator => stats.num_opamp_integrator += 1,
                        OpAmpRole::Differentiator => stats.num_opamp_differentiator += 1,
                        OpAmpRole::Summing => stats.num_opamp_summing += 1,
                    }
                }
                ComponentType::Open
                | ComponentType::BjtSmallSignal
                | ComponentType::MosfetSmallSignal => {}
            }
        }
        stats
    }
}
