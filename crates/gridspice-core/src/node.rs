//! Electrical node handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for an electrical node.
///
/// A node is an equivalence class of grid junctions connected by unmeasured
/// short edges. Ids are dense small integers; after re-grounding, node 0 is
/// the reference node at the voltage source's negative terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The ground node (node 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Create a new NodeId from a raw value.
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Get the raw node ID value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Check if this is the ground node.
    pub fn is_ground(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Netlist text spells nodes as bare integers, ground included.
        write!(f, "{}", self.0)
    }
}
