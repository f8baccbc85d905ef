// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Lattices, virtual helices and cells

use crate::{geometry, geometry::GridType, Point, UnitQuaternion};
use derive_getters::Getters;

/// Occupancy type of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellType {
    #[default]
    Normal,
    Deleted,
    Inserted,
}

impl CellType {
    /// Parse the single-letter manifest tag. Unknown tags are normal cells.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "d" => Self::Deleted,
            "i" => Self::Inserted,
            _ => Self::Normal,
        }
    }
}

/// One base-pair slot along a virtual helix
#[derive(Debug, Clone, PartialEq, Default, Getters)]
pub struct Cell {
    /// Index along the helix; also the depth used for placement
    number: i64,
    kind: CellType,
    /// Nucleotide ids traversed 5'→3'
    forward: Vec<i64>,
    /// Nucleotide ids traversed 3'→5'
    reverse: Vec<i64>,
}

impl Cell {
    pub fn new(number: i64, kind: CellType, forward: Vec<i64>, reverse: Vec<i64>) -> Self {
        Self {
            number,
            kind,
            forward,
            reverse,
        }
    }

    /// A cell is active if any strand passes through it
    pub fn is_active(&self) -> bool {
        !self.forward.is_empty() || !self.reverse.is_empty()
    }
}

/// Helical axis placed on a lattice position
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct VirtualHelix {
    id: i64,
    row: i64,
    column: i64,
    /// Initial phase in radians
    initial_angle: f64,
    /// Index of the last cell
    last_cell: i64,
    cells: Vec<Cell>,
}

impl VirtualHelix {
    /// Create a helix. If `last_cell` is not given, the highest cell number is used.
    pub fn new(
        id: i64,
        row: i64,
        column: i64,
        initial_angle: f64,
        last_cell: Option<i64>,
        cells: Vec<Cell>,
    ) -> Self {
        let last_cell = last_cell
            .or_else(|| cells.iter().map(Cell::number).max().copied())
            .unwrap_or(-1);
        Self {
            id,
            row,
            column,
            initial_angle,
            last_cell,
            cells,
        }
    }

    /// Cell record with the given number, if any
    pub fn cell(&self, number: i64) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.number == number)
    }
}

/// A 2D arrangement of virtual helices with an absolute frame
///
/// The center of mass of the active cells is computed once on construction and
/// subtracted from every raw cell position.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Lattice {
    name: String,
    grid: GridType,
    /// Absolute translation (Å)
    position: Point,
    /// Absolute orientation
    orientation: UnitQuaternion,
    helices: Vec<VirtualHelix>,
    /// Average raw position of all active cells (Å)
    center_of_mass: Point,
}

impl Lattice {
    pub fn new(
        name: impl Into<String>,
        grid: GridType,
        position: Point,
        orientation: UnitQuaternion,
        helices: Vec<VirtualHelix>,
    ) -> Self {
        let active = helices.iter().flat_map(|helix| {
            helix
                .cells
                .iter()
                .filter(|cell| cell.is_active())
                .map(move |cell| (helix.row, helix.column, cell.number))
        });
        let center_of_mass = geometry::center_of_mass(grid, active);
        Self {
            name: name.into(),
            grid,
            position,
            orientation,
            helices,
            center_of_mass,
        }
    }

    /// Move a point from the recentred lattice frame into the absolute frame (Å)
    pub fn to_world(&self, local: &Point) -> Point {
        self.orientation * local + self.position
    }

    /// Number of cells referenced by at least one nucleotide
    pub fn active_cell_count(&self) -> usize {
        self.helices
            .iter()
            .flat_map(|helix| helix.cells.iter())
            .filter(|cell| cell.is_active())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BASE_PAIR_RISE;
    use approx::assert_relative_eq;

    fn helix(row: i64, column: i64, cells: Vec<Cell>) -> VirtualHelix {
        VirtualHelix::new(0, row, column, 0.0, None, cells)
    }

    #[test]
    fn cell_tags() {
        assert_eq!(CellType::from_tag("n"), CellType::Normal);
        assert_eq!(CellType::from_tag("d"), CellType::Deleted);
        assert_eq!(CellType::from_tag("i"), CellType::Inserted);
        assert_eq!(CellType::from_tag("?"), CellType::Normal);
    }

    #[test]
    fn last_cell_defaults_to_highest_number() {
        let cells = vec![
            Cell::new(4, CellType::Normal, vec![], vec![]),
            Cell::new(9, CellType::Normal, vec![1], vec![]),
        ];
        assert_eq!(*helix(0, 0, cells.clone()).last_cell(), 9);
        assert_eq!(*VirtualHelix::new(0, 0, 0, 0.0, Some(20), cells).last_cell(), 20);
        assert_eq!(*helix(0, 0, vec![]).last_cell(), -1);
    }

    #[test]
    fn center_of_mass_ignores_empty_cells() {
        let cells = vec![
            Cell::new(0, CellType::Normal, vec![1], vec![]),
            Cell::new(1, CellType::Normal, vec![], vec![]),
            Cell::new(2, CellType::Normal, vec![], vec![2]),
        ];
        let lattice = Lattice::new(
            "l",
            GridType::Square,
            Point::zeros(),
            UnitQuaternion::identity(),
            vec![helix(0, 0, cells)],
        );
        assert_eq!(lattice.active_cell_count(), 2);
        assert_relative_eq!(
            *lattice.center_of_mass(),
            Point::new(10.0, -10.0, BASE_PAIR_RISE),
            epsilon = 1e-12
        );
    }

    #[test]
    fn world_frame() {
        let orientation = crate::units::euler_xyz(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let lattice = Lattice::new(
            "l",
            GridType::Honeycomb,
            Point::new(1.0, 2.0, 3.0),
            orientation,
            vec![],
        );
        assert_eq!(*lattice.center_of_mass(), Point::zeros());
        assert_relative_eq!(
            lattice.to_world(&Point::x()),
            Point::new(1.0, 3.0, 3.0),
            epsilon = 1e-12
        );
    }
}
