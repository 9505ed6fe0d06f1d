//! Component taxonomy for grid-synthesized circuits.
//!
//! Every edge slot in the grid carries one of these component kinds. The
//! variants form a closed set with associated metadata resolved by pattern
//! matching (SPICE name prefix, class predicates), so there are no parallel
//! lookup tables to keep in sync.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::branch::Measure;

/// Role of an op-amp edge.
///
/// Only [`OpAmpRole::Integrator`] has a first-class netlist expansion; the
/// remaining roles are reserved and compile through a high-gain fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpAmpRole {
    Inverting,
    NonInverting,
    Buffer,
    Integrator,
    Differentiator,
    Summing,
}

impl OpAmpRole {
    /// All roles, in a fixed order.
    pub const ALL: [OpAmpRole; 6] = [
        OpAmpRole::Inverting,
        OpAmpRole::NonInverting,
        OpAmpRole::Buffer,
        OpAmpRole::Integrator,
        OpAmpRole::Differentiator,
        OpAmpRole::Summing,
    ];
}

impl fmt::Display for OpAmpRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpAmpRole::Inverting => "inverting",
            OpAmpRole::NonInverting => "non-inverting",
            OpAmpRole::Buffer => "buffer",
            OpAmpRole::Integrator => "integrator",
            OpAmpRole::Differentiator => "differentiator",
            OpAmpRole::Summing => "summing",
        };
        write!(f, "{}", name)
    }
}

/// Kind of component occupying a grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    /// Zero-impedance connection. Unmeasured shorts collapse their
    /// endpoints into one electrical node.
    Short,
    VoltageSource,
    /// Permitted only as a sampling intermediate; converted to a resistor
    /// before circuit construction.
    CurrentSource,
    Resistor,
    Capacitor,
    Inductor,
    /// No connection; the edge slot is unused.
    Open,
    /// Voltage-controlled current source.
    Vccs,
    /// Voltage-controlled voltage source.
    Vcvs,
    /// Current-controlled current source.
    Cccs,
    /// Current-controlled voltage source.
    Ccvs,
    OpAmp(OpAmpRole),
    /// Small-signal BJT model. Reserved: never sampled by the default
    /// tables and has no netlist expansion.
    BjtSmallSignal,
    /// Small-signal MOSFET model. Reserved, like [`Self::BjtSmallSignal`].
    MosfetSmallSignal,
}

impl ComponentType {
    /// The one op-amp role with a native netlist expansion.
    pub const INTEGRATOR: ComponentType = ComponentType::OpAmp(OpAmpRole::Integrator);

    /// SPICE device-name prefix. Empty for kinds that never name a device
    /// of their own (shorts compile to bare ammeters, opens to nothing).
    pub fn spice_prefix(self) -> &'static str {
        match self {
            ComponentType::Resistor => "R",
            ComponentType::Capacitor => "C",
            ComponentType::Inductor => "L",
            ComponentType::VoltageSource => "V",
            ComponentType::CurrentSource => "I",
            ComponentType::Vccs => "G",
            ComponentType::Vcvs => "E",
            ComponentType::Cccs => "F",
            ComponentType::Ccvs => "H",
            ComponentType::OpAmp(_)
            | ComponentType::BjtSmallSignal
            | ComponentType::MosfetSmallSignal => "X",
            ComponentType::Short | ComponentType::Open => "",
        }
    }

    /// True for independent sources.
    pub fn is_source(self) -> bool {
        matches!(
            self,
            ComponentType::VoltageSource | ComponentType::CurrentSource
        )
    }

    /// True for the four dependent (controlled) sources.
    pub fn is_dependent(self) -> bool {
        matches!(
            self,
            ComponentType::Vccs | ComponentType::Vcvs | ComponentType::Cccs | ComponentType::Ccvs
        )
    }

    /// The measurement kind a dependent source is driven by, if any.
    pub fn control_kind(self) -> Option<Measure> {
        match self {
            ComponentType::Vccs | ComponentType::Vcvs => Some(Measure::Voltage),
            ComponentType::Cccs | ComponentType::Ccvs => Some(Measure::Current),
            _ => None,
        }
    }

    /// True for capacitors and inductors, which force AC analysis.
    pub fn is_reactive(self) -> bool {
        matches!(self, ComponentType::Capacitor | ComponentType::Inductor)
    }

    pub fn is_opamp(self) -> bool {
        matches!(self, ComponentType::OpAmp(_))
    }

    /// True when the kind carries a per-type sequence label worth
    /// renumbering (everything that names a device or a symbol).
    pub fn is_labeled(self) -> bool {
        !matches!(self, ComponentType::Short | ComponentType::Open)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::Short => write!(f, "short"),
            ComponentType::VoltageSource => write!(f, "voltage source"),
            ComponentType::CurrentSource => write!(f, "current source"),
            ComponentType::Resistor => write!(f, "resistor"),
            ComponentType::Capacitor => write!(f, "capacitor"),
            ComponentType::Inductor => write!(f, "inductor"),
            ComponentType::Open => write!(f, "open"),
            ComponentType::Vccs => write!(f, "VCCS"),
            ComponentType::Vcvs => write!(f, "VCVS"),
            ComponentType::Cccs => write!(f, "CCCS"),
            ComponentType::Ccvs => write!(f, "CCVS"),
            ComponentType::OpAmp(role) => write!(f, "{} op-amp", role),
            ComponentType::BjtSmallSignal => write!(f, "BJT small-signal model"),
            ComponentType::MosfetSmallSignal => write!(f, "MOSFET small-signal model"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(ComponentType::Resistor.spice_prefix(), "R");
        assert_eq!(ComponentType::Vcvs.spice_prefix(), "E");
        assert_eq!(ComponentType::Ccvs.spice_prefix(), "H");
        assert_eq!(ComponentType::Short.spice_prefix(), "");
        assert_eq!(ComponentType::INTEGRATOR.spice_prefix(), "X");
    }

    #[test]
    fn test_control_kinds() {
        assert_eq!(ComponentType::Vccs.control_kind(), Some(Measure::Voltage));
        assert_eq!(ComponentType::Cccs.control_kind(), Some(Measure::Current));
        assert_eq!(ComponentType::Resistor.control_kind(), None);
        for kind in [
            ComponentType::Vccs,
            ComponentType::Vcvs,
            ComponentType::Cccs,
            ComponentType::Ccvs,
        ] {
            assert!(kind.is_dependent());
        }
    }

    #[test]
    fn test_class_predicates() {
        assert!(ComponentType::Capacitor.is_reactive());
        assert!(!ComponentType::Resistor.is_reactive());
        assert!(ComponentType::VoltageSource.is_source());
        assert!(!ComponentType::Vcvs.is_source());
        assert!(!ComponentType::Short.is_labeled());
        assert!(ComponentType::INTEGRATOR.is_labeled());
    }
}
