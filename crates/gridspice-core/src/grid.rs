//! The junction grid and its candidate component edges.
//!
//! An `m x n` grid has `m * n` junctions. Between vertically adjacent
//! junctions sit `(m-1) * n` vertical edge slots; between horizontally
//! adjacent junctions sit `m * (n-1)` horizontal slots. Every slot holds an
//! [`Edge`], present or not, and the grid also carries jittered drawing
//! coordinates for the diagram backend.

use crate::branch::Measure;
use crate::component::ComponentType;
use crate::units::ValueUnit;

/// Which family of edge slots a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Address of one edge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    pub orientation: Orientation,
    pub i: usize,
    pub j: usize,
}

impl EdgeRef {
    pub fn vertical(i: usize, j: usize) -> Self {
        EdgeRef {
            orientation: Orientation::Vertical,
            i,
            j,
        }
    }

    pub fn horizontal(i: usize, j: usize) -> Self {
        EdgeRef {
            orientation: Orientation::Horizontal,
            i,
            j,
        }
    }

    /// Junction coordinates of the edge's two endpoints, in grid order
    /// (before any direction swap).
    pub fn endpoints(self) -> ((usize, usize), (usize, usize)) {
        match self.orientation {
            Orientation::Vertical => ((self.i, self.j), (self.i + 1, self.j)),
            Orientation::Horizontal => ((self.i, self.j), (self.i, self.j + 1)),
        }
    }
}

/// One candidate component placement between two adjacent junctions.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Whether the edge physically exists in this sample.
    pub present: bool,
    pub kind: ComponentType,
    /// Per-type sequence number; unique within its type after relabeling.
    pub label: u32,
    pub value: u32,
    pub unit: ValueUnit,
    /// Set when the second grid endpoint is the reference positive terminal.
    pub direction: bool,
    pub measure: Measure,
    /// Measurement label, -1 when unset.
    pub measure_label: i32,
    pub measure_direction: bool,
    /// For dependent sources: the measurement label of the controlling
    /// branch. -1 when unbound.
    pub control_label: i32,
}

impl Edge {
    /// An unoccupied slot.
    pub fn absent() -> Self {
        Edge {
            present: false,
            kind: ComponentType::Open,
            label: 0,
            value: 0,
            unit: ValueUnit::One,
            direction: false,
            measure: Measure::None,
            measure_label: -1,
            measure_direction: false,
            control_label: -1,
        }
    }

    /// A present, unmeasured edge of the given kind and value.
    pub fn component(kind: ComponentType, value: u32) -> Self {
        Edge {
            present: true,
            kind,
            value,
            ..Edge::absent()
        }
    }
}

impl Default for Edge {
    fn default() -> Self {
        Edge::absent()
    }
}

/// An `m x n` grid of junctions with candidate edges on every slot.
#[derive(Debug, Clone)]
pub struct Grid {
    m: usize,
    n: usize,
    /// `(m-1) * n` slots, row-major.
    vertical: Vec<Edge>,
    /// `m * (n-1)` slots, row-major.
    horizontal: Vec<Edge>,
    /// Drawing coordinate of each junction row.
    row_coords: Vec<f64>,
    /// Drawing coordinate of each junction column.
    col_coords: Vec<f64>,
}

impl Grid {
    /// Create a grid with every slot absent and coordinates on a unit pitch.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is below 2; a single row or column has no
    /// closed paths.
    pub fn new(m: usize, n: usize) -> Self {
        assert!(m >= 2 && n >= 2, "grid must be at least 2x2");
        Grid {
            m,
            n,
            vertical: vec![Edge::absent(); (m - 1) * n],
            horizontal: vec![Edge::absent(); m * (n - 1)],
            row_coords: (0..m).map(|i| i as f64).collect(),
            col_coords: (0..n).map(|j| j as f64).collect(),
        }
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn junction_count(&self) -> usize {
        self.m * self.n
    }

    pub fn edge(&self, r: EdgeRef) -> &Edge {
        match r.orientation {
            Orientation::Vertical => &self.vertical[r.i * self.n + r.j],
            Orientation::Horizontal => &self.horizontal[r.i * (self.n - 1) + r.j],
        }
    }

    pub fn edge_mut(&mut self, r: EdgeRef) -> &mut Edge {
        match r.orientation {
            Orientation::Vertical => &mut self.vertical[r.i * self.n + r.j],
            Orientation::Horizontal => &mut self.horizontal[r.i * (self.n - 1) + r.j],
        }
    }

    pub fn vertical(&self, i: usize, j: usize) -> &Edge {
        self.edge(EdgeRef::vertical(i, j))
    }

    pub fn horizontal(&self, i: usize, j: usize) -> &Edge {
        self.edge(EdgeRef::horizontal(i, j))
    }

    /// Relabeling scan order: every vertical slot row-major, then every
    /// horizontal slot row-major.
    pub fn scan_refs(&self) -> impl Iterator<Item = EdgeRef> {
        let (m, n) = (self.m, self.n);
        let vertical = (0..m - 1).flat_map(move |i| (0..n).map(move |j| EdgeRef::vertical(i, j)));
        let horizontal = (0..m).flat_map(move |i| (0..n - 1).map(move |j| EdgeRef::horizontal(i, j)));
        vertical.chain(horizontal)
    }

    /// Assembly walk order: row-major over cells, the cell's vertical edge
    /// before its horizontal edge. Branch insertion order derives from this.
    pub fn walk_refs(&self) -> impl Iterator<Item = EdgeRef> {
        let (m, n) = (self.m, self.n);
        (0..m).flat_map(move |i| {
            (0..n).flat_map(move |j| {
                let vertical = (i < m - 1).then(|| EdgeRef::vertical(i, j));
                let horizontal = (j < n - 1).then(|| EdgeRef::horizontal(i, j));
                vertical.into_iter().chain(horizontal)
            })
        })
    }

    pub fn row_coord(&self, i: usize) -> f64 {
        self.row_coords[i]
    }

    pub fn col_coord(&self, j: usize) -> f64 {
        self.col_coords[j]
    }

    /// Replace the drawing coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the vectors do not match the grid dimensions.
    pub fn set_coordinates(&mut self, rows: Vec<f64>, cols: Vec<f64>) {
        assert_eq!(rows.len(), self.m);
        assert_eq!(cols.len(), self.n);
        self.row_coords = rows;
        self.col_coords = cols;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_counts() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.scan_refs().count(), (3 - 1) * 4 + 3 * (4 - 1));
        assert_eq!(grid.walk_refs().count(), grid.scan_refs().count());
        assert_eq!(grid.junction_count(), 12);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            EdgeRef::vertical(1, 2).endpoints(),
            ((1, 2), (2, 2))
        );
        assert_eq!(
            EdgeRef::horizontal(0, 3).endpoints(),
            ((0, 3), (0, 4))
        );
    }

    #[test]
    fn test_walk_order_visits_vertical_first() {
        let grid = Grid::new(2, 2);
        let refs: Vec<EdgeRef> = grid.walk_refs().collect();
        // Cell (0,0): vertical then horizontal; then (0,1) vertical;
        // then row 1's horizontal.
        assert_eq!(refs[0], EdgeRef::vertical(0, 0));
        assert_eq!(refs[1], EdgeRef::horizontal(0, 0));
        assert_eq!(refs[2], EdgeRef::vertical(0, 1));
        assert_eq!(refs[3], EdgeRef::horizontal(1, 0));
    }

    #[test]
    fn test_edge_mutation() {
        let mut grid = Grid::new(2, 2);
        grid.edge_mut(EdgeRef::vertical(0, 0)).present = true;
        assert!(grid.vertical(0, 0).present);
        assert!(!grid.horizontal(0, 0).present);
    }
}
