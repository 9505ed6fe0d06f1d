//! Branch-list-to-SPICE compilation.
//!
//! Branches compile in insertion order. Current measurements splice a
//! zero-valued auxiliary voltage source (an ammeter) in series through a
//! synthetic mid node; current-controlled sources reference the ammeter of
//! their control branch by name, so ammeter numbering is precomputed over
//! the whole branch list before any line is written.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use gridspice_core::units::format_value;
use gridspice_core::{
    AnalysisKind, Branch, Circuit, ComponentType, Measure, NodeId, OpAmpRole,
};

/// Output flavor knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpiceOptions {
    /// Write symbolic placeholders instead of numeric values.
    pub symbolic: bool,
}

/// Generated netlist plus any degradation diagnostics.
#[derive(Debug, Clone)]
pub struct SpiceOutput {
    /// Complete netlist text, `.title` through `.end`.
    pub text: String,
    /// One note per branch the generator could not compile faithfully.
    pub notes: Vec<String>,
}

/// Compile a circuit into SPICE text.
pub fn generate(circuit: &Circuit, options: &SpiceOptions) -> SpiceOutput {
    let mut emitter = Emitter::new(circuit, options.symbolic);
    for branch in circuit.branches() {
        emitter.emit_branch(branch);
    }
    let control = emitter.control_block();
    let text = format!(
        ".title Active DC Circuit\n{}\n\n{}.end\n",
        emitter.devices, control
    );
    SpiceOutput {
        text,
        notes: emitter.notes,
    }
}

struct Emitter<'a> {
    circuit: &'a Circuit,
    symbolic: bool,
    devices: String,
    notes: Vec<String>,
    /// Branch order -> 1-based ammeter number, for every current-measured
    /// branch.
    ammeter_numbers: HashMap<usize, usize>,
    used_names: HashSet<String>,
    collision_counters: HashMap<ComponentType, u32>,
}

impl<'a> Emitter<'a> {
    fn new(circuit: &'a Circuit, symbolic: bool) -> Self {
        let mut ammeter_numbers = HashMap::new();
        let mut next = 0usize;
        for branch in circuit.branches() {
            if branch.measure == Measure::Current {
                next += 1;
                ammeter_numbers.insert(branch.order, next);
            }
        }
        Emitter {
            circuit,
            symbolic,
            devices: String::new(),
            notes: Vec::new(),
            ammeter_numbers,
            used_names: HashSet::new(),
            collision_counters: HashMap::new(),
        }
    }

    /// `{prefix}{label}`, de-duplicated with a per-type numeric suffix.
    /// Collisions only arise after enforcement demotions merge label
    /// spaces.
    fn device_name(&mut self, branch: &Branch) -> String {
        let prefix = branch.kind.spice_prefix();
        let mut name = format!("{}{}", prefix, branch.label);
        while self.used_names.contains(&name) {
            let counter = self.collision_counters.entry(branch.kind).or_insert(0);
            *counter += 1;
            name = format!("{}{}_{}", prefix, branch.label, counter);
        }
        self.used_names.insert(name.clone());
        name
    }

    fn value_text(&self, branch: &Branch) -> String {
        if self.symbolic {
            "<Empty>".to_string()
        } else {
            format_value(branch.value, branch.unit)
        }
    }

    fn ammeter_name(&self, order: usize) -> String {
        let number = self
            .ammeter_numbers
            .get(&order)
            .expect("ammeter numbering covers every current-measured branch");
        format!("VI{}", number)
    }

    fn emit_branch(&mut self, branch: &Branch) {
        match branch.kind {
            ComponentType::Short => self.emit_short(branch),
            ComponentType::VoltageSource
            | ComponentType::CurrentSource
            | ComponentType::Resistor
            | ComponentType::Capacitor
            | ComponentType::Inductor => self.emit_two_terminal(branch),
            ComponentType::Cccs | ComponentType::Ccvs => self.emit_current_controlled(branch),
            ComponentType::Vccs | ComponentType::Vcvs => self.emit_voltage_controlled(branch),
            ComponentType::OpAmp(OpAmpRole::Integrator) => self.emit_integrator(branch),
            ComponentType::OpAmp(role) => self.emit_opamp_fallback(branch, role),
            ComponentType::BjtSmallSignal | ComponentType::MosfetSmallSignal => {
                self.notes.push(format!(
                    "{} at branch {} has no device expansion; omitted",
                    branch.kind, branch.order
                ));
            }
            ComponentType::Open => {}
        }
    }

    /// A short that survived assembly carries a current probe; it compiles
    /// to the bare ammeter.
    fn emit_short(&mut self, branch: &Branch) {
        debug_assert_eq!(branch.measure, Measure::Current);
        let ammeter = self.ammeter_name(branch.order);
        let _ = writeln!(self.devices, "{} {} {} 0", ammeter, branch.n1, branch.n2);
    }

    /// Write the series ammeter bridging `mid` to the branch's second
    /// terminal, honoring the measurement direction.
    fn emit_ammeter(&mut self, branch: &Branch, mid: &str) {
        let ammeter = self.ammeter_name(branch.order);
        if branch.measure_same_direction {
            let _ = writeln!(self.devices, "{} {} {} 0", ammeter, mid, branch.n2);
        } else {
            let _ = writeln!(self.devices, "{} {} {} 0", ammeter, branch.n2, mid);
        }
    }

    fn emit_two_terminal(&mut self, branch: &Branch) {
        let name = self.device_name(branch);
        // AC runs stimulate through the source as a step; everything else
        // writes its plain value.
        let value = if branch.kind == ComponentType::VoltageSource
            && self.circuit.analysis() == AnalysisKind::Ac
        {
            let amplitude = if self.symbolic {
                name.clone()
            } else {
                branch.value.to_string()
            };
            format!("step {}", amplitude)
        } else {
            self.value_text(branch)
        };

        if branch.measure == Measure::Current {
            let mid = format!("N{}{}", branch.n1, branch.n2);
            let _ = writeln!(self.devices, "{} {} {} {}", name, branch.n1, mid, value);
            self.emit_ammeter(branch, &mid);
        } else {
            let _ = writeln!(
                self.devices,
                "{} {} {} {}",
                name, branch.n1, branch.n2, value
            );
        }
    }

    fn dependent_gain(&self, branch: &Branch) -> String {
        if !self.symbolic {
            return self.value_text(branch);
        }
        // Current-output sources read y, voltage-output sources read x.
        match branch.kind {
            ComponentType::Cccs | ComponentType::Vccs => format!("y_{}", branch.label),
            _ => format!("x_{}", branch.label),
        }
    }

    fn emit_current_controlled(&mut self, branch: &Branch) {
        let name = self.device_name(branch);
        let control = self
            .circuit
            .branches()
            .iter()
            .find(|b| b.carries_measurement(branch.control_label, Measure::Current))
            .expect("control binding validated at assembly");
        let control_ammeter = self.ammeter_name(control.order);
        let gain = self.dependent_gain(branch);

        if branch.measure == Measure::Current {
            let mid = format!("N{}{}", branch.n1, branch.n2);
            let _ = writeln!(
                self.devices,
                "{} {} {} {} {}",
                name, branch.n1, mid, control_ammeter, gain
            );
            self.emit_ammeter(branch, &mid);
        } else {
            let _ = writeln!(
                self.devices,
                "{} {} {} {} {}",
                name, branch.n1, branch.n2, control_ammeter, gain
            );
        }
    }

    fn emit_voltage_controlled(&mut self, branch: &Branch) {
        let name = self.device_name(branch);
        let control = self
            .circuit
            .branches()
            .iter()
            .find(|b| b.carries_measurement(branch.control_label, Measure::Voltage))
            .expect("control binding validated at assembly");
        let (cn1, cn2) = (control.n1, control.n2);
        let gain = self.dependent_gain(branch);

        if branch.measure == Measure::Current {
            let mid = format!("N{}{}", branch.n1, branch.n2);
            let _ = writeln!(
                self.devices,
                "{} {} {} {} {} {}",
                name, branch.n1, mid, cn1, cn2, gain
            );
            self.emit_ammeter(branch, &mid);
        } else {
            let _ = writeln!(
                self.devices,
                "{} {} {} {} {} {}",
                name, branch.n1, branch.n2, cn1, cn2, gain
            );
        }
    }

    /// Expand an ideal integrator into its primitive feedback network: an
    /// input resistor into a synthetic inverting node, the feedback
    /// capacitor from the output, and a very-high-gain dependent voltage
    /// source standing in for the op-amp.
    fn emit_integrator(&mut self, branch: &Branch) {
        let name = self.device_name(branch);
        let suffix = &name[1..];
        let inverting = 30 + branch.label;

        let time_constant = if self.symbolic { 1 } else { branch.value };
        let resistor = if time_constant > 10 {
            (time_constant / 10).max(1)
        } else {
            1
        };
        let capacitor = if time_constant > resistor {
            (time_constant - resistor).max(1)
        } else {
            1
        };
        let (r_value, c_value) = if self.symbolic {
            ("<Empty>".to_string(), "<Empty>".to_string())
        } else {
            (resistor.to_string(), format!("{}e-6", capacitor))
        };
        let gain = if self.symbolic { "Ad" } else { "100000" };

        let _ = writeln!(self.devices, "* integrator: R-C feedback around an ideal op-amp");
        let _ = writeln!(
            self.devices,
            "Rint{} {} {} {}",
            suffix, branch.n1, inverting, r_value
        );
        let _ = writeln!(
            self.devices,
            "Cint{} {} {} {}",
            suffix, branch.n2, inverting, c_value
        );

        // The output terminal is settled before the op-amp line is
        // written: a current probe retargets it through the ammeter's mid
        // node.
        if branch.measure == Measure::Current {
            let mid = format!("Nmeas{}", suffix);
            let _ = writeln!(
                self.devices,
                "Eint{} {} 0 0 {} {}",
                suffix, mid, inverting, gain
            );
            let ammeter = self.ammeter_name(branch.order);
            let _ = writeln!(self.devices, "{} {} {} 0", ammeter, mid, branch.n2);
        } else {
            let _ = writeln!(
                self.devices,
                "Eint{} {} 0 0 {} {}",
                suffix, branch.n2, inverting, gain
            );
        }
    }

    /// Reserved op-amp roles compile to a bare high-gain stage.
    fn emit_opamp_fallback(&mut self, branch: &Branch, role: OpAmpRole) {
        self.notes.push(format!(
            "{} op-amp at branch {} has no native model; emitted high-gain fallback",
            role, branch.order
        ));
        let name = self.device_name(branch);
        let ename = format!("E{}", &name[1..]);
        let gain = if self.symbolic {
            "Ad".to_string()
        } else {
            branch.value.to_string()
        };

        let _ = writeln!(self.devices, "* fallback: ideal high-gain stage");
        if branch.measure == Measure::Current {
            let mid = format!("N{}{}", branch.n1, branch.n2);
            let _ = writeln!(
                self.devices,
                "{} {} 0 0 {} {}",
                ename, mid, branch.n1, gain
            );
            let ammeter = self.ammeter_name(branch.order);
            let _ = writeln!(self.devices, "{} {} {} 0", ammeter, mid, branch.n2);
        } else {
            let _ = writeln!(
                self.devices,
                "{} {} 0 0 {} {}",
                ename, branch.n2, branch.n1, gain
            );
        }
    }

    fn control_block(&self) -> String {
        let mut block = String::new();
        match self.circuit.analysis() {
            AnalysisKind::Dc => {
                block.push_str(".control\nop\n");
                for branch in self.circuit.branches() {
                    self.push_probe(&mut block, branch, AnalysisKind::Dc);
                }
            }
            AnalysisKind::Ac => {
                block.push_str(".control\nac dec 10 1 100k\n");
                for branch in self.circuit.branches() {
                    self.push_probe(&mut block, branch, AnalysisKind::Ac);
                }
            }
        }
        block.push_str(".endc\n");
        block
    }

    fn push_probe(&self, block: &mut String, branch: &Branch, analysis: AnalysisKind) {
        let label = if branch.measure_label == -1 {
            String::new()
        } else {
            branch.measure_label.to_string()
        };
        match branch.measure {
            Measure::None => {}
            Measure::Voltage => {
                let (a, b) = if branch.measure_same_direction {
                    (branch.n1, branch.n2)
                } else {
                    (branch.n2, branch.n1)
                };
                let _ = match analysis {
                    AnalysisKind::Dc => {
                        if a == NodeId::GROUND {
                            writeln!(block, "print -v({}) ; measurement of U{}", b, label)
                        } else if b == NodeId::GROUND {
                            writeln!(block, "print v({}) ; measurement of U{}", a, label)
                        } else {
                            writeln!(block, "print v({}, {}) ; measurement of U{}", a, b, label)
                        }
                    }
                    AnalysisKind::Ac => {
                        if a == NodeId::GROUND {
                            writeln!(
                                block,
                                "print vm({}) vp({}) ; AC magnitude and phase of U{}",
                                b, b, label
                            )
                        } else if b == NodeId::GROUND {
                            writeln!(
                                block,
                                "print vm({}) vp({}) ; AC magnitude and phase of U{}",
                                a, a, label
                            )
                        } else {
                            writeln!(
                                block,
                                "print vm({},{}) vp({},{}) ; AC magnitude and phase of U{}",
                                a, b, a, b, label
                            )
                        }
                    }
                };
            }
            Measure::Current => {
                let ammeter = self.ammeter_name(branch.order);
                let _ = match analysis {
                    AnalysisKind::Dc => {
                        writeln!(block, "print i({}) ; measurement of I{}", ammeter, label)
                    }
                    AnalysisKind::Ac => writeln!(
                        block,
                        "print im({}) ip({}) ; AC magnitude and phase of I{}",
                        ammeter, ammeter, label
                    ),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridspice_core::{BuildOptions, Edge, EdgeRef, Grid};

    fn ring_2x2(left: ComponentType, right: ComponentType) -> Grid {
        let mut grid = Grid::new(2, 2);
        let mut source = Edge::component(left, 10);
        source.label = 1;
        let mut load = Edge::component(right, 50);
        load.label = 1;
        *grid.edge_mut(EdgeRef::vertical(0, 0)) = source;
        *grid.edge_mut(EdgeRef::vertical(0, 1)) = load;
        *grid.edge_mut(EdgeRef::horizontal(0, 0)) = Edge::component(ComponentType::Short, 0);
        *grid.edge_mut(EdgeRef::horizontal(1, 0)) = Edge::component(ComponentType::Short, 0);
        grid
    }

    fn build(grid: Grid) -> Circuit {
        Circuit::build(grid, &BuildOptions::default()).unwrap()
    }

    #[test]
    fn test_minimal_dc_netlist() {
        let circuit = build(ring_2x2(
            ComponentType::VoltageSource,
            ComponentType::Resistor,
        ));
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.notes.is_empty());
        assert!(out.text.starts_with(".title Active DC Circuit\n"));
        assert!(out.text.ends_with(".end\n"));
        assert!(out.text.contains("V1 1 0 10\n"));
        assert!(out.text.contains("R1 1 0 50\n"));
        assert!(out.text.contains(".control\nop\n"));
        assert_eq!(out.text.matches("\nV").count(), 1);
    }

    #[test]
    fn test_symbolic_values_are_placeholders() {
        let circuit = build(ring_2x2(
            ComponentType::VoltageSource,
            ComponentType::Resistor,
        ));
        let out = generate(&circuit, &SpiceOptions { symbolic: true });
        assert!(out.text.contains("V1 1 0 <Empty>\n"));
        assert!(out.text.contains("R1 1 0 <Empty>\n"));
    }

    #[test]
    fn test_current_measurement_splices_ammeter() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Resistor);
        let load = grid.edge_mut(EdgeRef::vertical(0, 1));
        load.measure = Measure::Current;
        load.measure_label = 2;
        load.measure_direction = false; // agrees with direction=false
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.text.contains("R1 1 N10 50\n"));
        assert!(out.text.contains("VI1 N10 0 0\n"));
        assert!(out.text.contains("print i(VI1) ; measurement of I2\n"));
    }

    #[test]
    fn test_reversed_measurement_flips_ammeter() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Resistor);
        let load = grid.edge_mut(EdgeRef::vertical(0, 1));
        load.measure = Measure::Current;
        load.measure_label = 2;
        load.measure_direction = true; // disagrees with direction=false
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.text.contains("VI1 0 N10 0\n"));
    }

    #[test]
    fn test_voltage_probe_uses_single_node_form_at_ground() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Resistor);
        let load = grid.edge_mut(EdgeRef::vertical(0, 1));
        load.measure = Measure::Voltage;
        load.measure_label = 3;
        load.measure_direction = false;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        // Probe endpoints are (1, 0): the two-argument form collapses to
        // v(1).
        assert!(out.text.contains("print v(1) ; measurement of U3\n"));
    }

    #[test]
    fn test_reactive_circuit_selects_ac_sweep() {
        let circuit = build(ring_2x2(
            ComponentType::VoltageSource,
            ComponentType::Capacitor,
        ));
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.text.contains(".control\nac dec 10 1 100k\n"));
        // The source becomes a step stimulus under AC.
        assert!(out.text.contains("V1 1 0 step 10\n"));
    }

    #[test]
    fn test_vcvs_references_control_nodes() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Vcvs);
        // Probe the voltage across a third branch: replace the bottom
        // short with a measured resistor.
        let mut probe = Edge::component(ComponentType::Resistor, 20);
        probe.label = 1;
        probe.measure = Measure::Voltage;
        probe.measure_label = 5;
        *grid.edge_mut(EdgeRef::horizontal(1, 0)) = probe;
        grid.edge_mut(EdgeRef::vertical(0, 1)).control_label = 5;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        let control = circuit
            .branches()
            .iter()
            .find(|b| b.measure == Measure::Voltage)
            .unwrap();
        assert!(out.text.contains("E1 "));
        assert!(out
            .text
            .contains(&format!(" {} {} 50\n", control.n1, control.n2)));
    }

    #[test]
    fn test_cccs_references_control_ammeter() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Cccs);
        let mut probe = Edge::component(ComponentType::Resistor, 20);
        probe.label = 1;
        probe.measure = Measure::Current;
        probe.measure_label = 5;
        *grid.edge_mut(EdgeRef::horizontal(1, 0)) = probe;
        grid.edge_mut(EdgeRef::vertical(0, 1)).control_label = 5;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.text.contains("F1 "));
        assert!(out.text.contains(" VI1 50\n"));
    }

    #[test]
    fn test_integrator_expansion() {
        let mut grid = ring_2x2(
            ComponentType::VoltageSource,
            ComponentType::INTEGRATOR,
        );
        grid.edge_mut(EdgeRef::vertical(0, 1)).value = 47;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        // 47 splits into R=4 and C=43 (microfarads).
        assert!(out.text.contains("Rint1 1 31 4\n"));
        assert!(out.text.contains("Cint1 0 31 43e-6\n"));
        assert!(out.text.contains("Eint1 0 0 0 31 100000\n"));
        assert!(out.notes.is_empty());
    }

    #[test]
    fn test_integrator_current_probe_retargets_output() {
        let mut grid = ring_2x2(
            ComponentType::VoltageSource,
            ComponentType::INTEGRATOR,
        );
        let edge = grid.edge_mut(EdgeRef::vertical(0, 1));
        edge.value = 5;
        edge.measure = Measure::Current;
        edge.measure_label = 1;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.text.contains("Eint1 Nmeas1 0 0 31 100000\n"));
        assert!(out.text.contains("VI1 Nmeas1 0 0\n"));
    }

    #[test]
    fn test_reserved_opamp_role_falls_back() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Resistor);
        grid.edge_mut(EdgeRef::vertical(0, 1)).kind =
            ComponentType::OpAmp(OpAmpRole::Buffer);
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        assert_eq!(out.notes.len(), 1);
        assert!(out.notes[0].contains("buffer"));
        assert!(out.text.contains("* fallback: ideal high-gain stage\n"));
        assert!(out.text.contains("E1 0 0 0 1 50\n"));
    }

    #[test]
    fn test_device_name_collision_gets_suffix() {
        // Two resistors sharing label 1, as can happen on a hand-built
        // grid that skipped relabeling.
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Resistor);
        let mut extra = Edge::component(ComponentType::Resistor, 30);
        extra.label = 1;
        *grid.edge_mut(EdgeRef::horizontal(1, 0)) = extra;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        assert!(out.text.contains("R1 "));
        assert!(out.text.contains("R1_1 "));
    }

    #[test]
    fn test_measured_short_emits_bare_ammeter() {
        let mut grid = ring_2x2(ComponentType::VoltageSource, ComponentType::Resistor);
        let short = grid.edge_mut(EdgeRef::horizontal(1, 0));
        short.measure = Measure::Current;
        short.measure_label = 9;
        let circuit = build(grid);
        let out = generate(&circuit, &SpiceOptions::default());
        // Three branches now; the short compiles to a single VI line with
        // a zero value.
        assert_eq!(circuit.branches().len(), 3);
        assert!(out.text.contains("print i(VI1) ; measurement of I9\n"));
    }
}
