//! Circuit assembly: grid plus resolved nodes plus the ordered branch list.
//!
//! Construction runs the whole validation pipeline. A [`Circuit`] either
//! comes out fully valid or not at all; the first failing invariant aborts
//! with an [`InvalidCircuit`] and no partial state escapes.

use crate::branch::{conflicts, Branch};
use crate::component::ComponentType;
use crate::error::{InvalidCircuit, Result};
use crate::grid::Grid;
use crate::resolve::{degree_table, reground, unify_nodes, NodeMap};
use crate::stats::CircuitStats;

/// Simulation control block the netlist will request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    /// DC operating point.
    Dc,
    /// AC frequency sweep; selected when any branch is reactive.
    Ac,
}

/// Knobs that affect circuit construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Force AC analysis even for purely resistive circuits.
    pub force_ac: bool,
}

/// A structurally valid circuit ready for netlist and diagram generation.
#[derive(Debug, Clone)]
pub struct Circuit {
    grid: Grid,
    nodes: NodeMap,
    branches: Vec<Branch>,
    analysis: AnalysisKind,
}

impl Circuit {
    /// Resolve, validate, and assemble a sampled grid.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: a dangling junction, an
    /// implicit short across a non-short component, a forbidden
    /// type/measurement pair, or a dependent source whose control label
    /// does not match exactly one measurement of the required kind.
    pub fn build(grid: Grid, options: &BuildOptions) -> Result<Self> {
        let n = grid.n();
        let degree = degree_table(&grid);
        for (idx, &d) in degree.iter().enumerate() {
            if d == 1 {
                return Err(InvalidCircuit::DanglingJunction {
                    i: idx / n,
                    j: idx % n,
                });
            }
        }

        let mut nodes = unify_nodes(&grid);
        let mut branches = Vec::new();

        for r in grid.walk_refs() {
            let edge = grid.edge(r);
            if !edge.present {
                continue;
            }
            debug_assert!(edge.kind != ComponentType::Open, "open edges are never present");

            let ((i1, j1), (i2, j2)) = r.endpoints();
            let a = nodes.node(i1, j1);
            let b = nodes.node(i2, j2);
            if a == b {
                // An unmeasured short between unified junctions is the
                // collapse itself; anything else shorts a real component.
                if edge.kind != ComponentType::Short {
                    return Err(InvalidCircuit::ImplicitShort { kind: edge.kind });
                }
                continue;
            }

            if conflicts(edge.kind, edge.measure) {
                return Err(InvalidCircuit::MeasureConflict {
                    kind: edge.kind,
                    measure: edge.measure,
                });
            }

            let (n1, n2) = if edge.direction { (b, a) } else { (a, b) };
            let order = branches.len();
            branches.push(Branch {
                n1,
                n2,
                kind: edge.kind,
                label: edge.label,
                value: edge.value,
                unit: edge.unit,
                measure: edge.measure,
                measure_label: edge.measure_label,
                measure_same_direction: edge.measure_direction == edge.direction,
                control_label: edge.control_label,
                order,
            });
        }

        for branch in &branches {
            if let Some(kind) = branch.kind.control_kind() {
                let found = branches
                    .iter()
                    .filter(|b| b.carries_measurement(branch.control_label, kind))
                    .count();
                if found != 1 {
                    return Err(InvalidCircuit::UnboundControl {
                        label: branch.control_label,
                        kind,
                        found,
                    });
                }
            }
        }

        let analysis = if options.force_ac || branches.iter().any(|b| b.kind.is_reactive()) {
            AnalysisKind::Ac
        } else {
            AnalysisKind::Dc
        };

        // Re-ground at the negative terminal of the first voltage source.
        if let Some(ground) = branches
            .iter()
            .find(|b| b.kind == ComponentType::VoltageSource)
            .map(|b| b.n2)
        {
            for branch in &mut branches {
                branch.n1 = reground(branch.n1, ground);
                branch.n2 = reground(branch.n2, ground);
            }
            nodes.reground(ground);
        }

        Ok(Circuit {
            grid,
            nodes,
            branches,
            analysis,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Junction-to-node map, post-grounding. The diagram backend reads
    /// node ids off this together with the grid coordinates.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Branches in assembly order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn analysis(&self) -> AnalysisKind {
        self.analysis
    }

    /// Number of distinct electrical nodes, isolated junctions included.
    pub fn node_count(&self) -> usize {
        self.nodes.count()
    }

    pub fn stats(&self) -> CircuitStats {
        CircuitStats::collect(self.node_count(), &self.branches)
    }
}
