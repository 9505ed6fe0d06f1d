//! Netlist-level branches and measurement requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::ComponentType;
use crate::node::NodeId;
use crate::units::ValueUnit;

/// Measurement requested on a branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    #[default]
    None,
    Voltage,
    Current,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::None => write!(f, "none"),
            Measure::Voltage => write!(f, "voltage"),
            Measure::Current => write!(f, "current"),
        }
    }
}

/// Pairs of component kind and measurement that can never coexist: shorts
/// have no voltage to probe, opens carry no current, and a source measured
/// in its own native quantity is degenerate.
pub fn conflicts(kind: ComponentType, measure: Measure) -> bool {
    matches!(
        (kind, measure),
        (ComponentType::Short, Measure::Voltage)
            | (ComponentType::Open, Measure::Current)
            | (ComponentType::VoltageSource, Measure::Voltage)
            | (ComponentType::Vcvs, Measure::Voltage)
            | (ComponentType::Ccvs, Measure::Voltage)
            | (ComponentType::CurrentSource, Measure::Current)
            | (ComponentType::Vccs, Measure::Current)
            | (ComponentType::Cccs, Measure::Current)
    )
}

/// One netlist branch between two resolved electrical nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub n1: NodeId,
    pub n2: NodeId,
    pub kind: ComponentType,
    pub label: u32,
    pub value: u32,
    pub unit: ValueUnit,
    pub measure: Measure,
    /// Measurement label, -1 when unset.
    pub measure_label: i32,
    /// Whether the measurement direction agrees with the branch direction.
    pub measure_same_direction: bool,
    /// For dependent sources, the measurement label of the control branch.
    pub control_label: i32,
    /// Insertion sequence from the assembly walk; device naming and
    /// ammeter numbering are keyed to it.
    pub order: usize,
}

impl Branch {
    /// True when this branch is the control target of the given label and
    /// measurement kind.
    pub fn carries_measurement(&self, label: i32, kind: Measure) -> bool {
        self.measure == kind && self.measure_label == label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_table() {
        assert!(conflicts(ComponentType::Short, Measure::Voltage));
        assert!(conflicts(ComponentType::Open, Measure::Current));
        assert!(conflicts(ComponentType::VoltageSource, Measure::Voltage));
        assert!(conflicts(ComponentType::CurrentSource, Measure::Current));
        assert!(conflicts(ComponentType::Vccs, Measure::Current));
        assert!(conflicts(ComponentType::Ccvs, Measure::Voltage));

        assert!(!conflicts(ComponentType::Short, Measure::Current));
        assert!(!conflicts(ComponentType::VoltageSource, Measure::Current));
        assert!(!conflicts(ComponentType::Resistor, Measure::Voltage));
        assert!(!conflicts(ComponentType::Resistor, Measure::Current));
        assert!(!conflicts(ComponentType::Vcvs, Measure::Current));
    }

    #[test]
    fn test_carries_measurement() {
        let branch = Branch {
            n1: NodeId::new(1),
            n2: NodeId::new(2),
            kind: ComponentType::Resistor,
            label: 1,
            value: 10,
            unit: ValueUnit::One,
            measure: Measure::Current,
            measure_label: 3,
            measure_same_direction: true,
            control_label: -1,
            order: 0,
        };
        assert!(branch.carries_measurement(3, Measure::Current));
        assert!(!branch.carries_measurement(3, Measure::Voltage));
        assert!(!branch.carries_measurement(4, Measure::Current));
    }
}
