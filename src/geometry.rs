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

//! # Lattice geometry
//!
//! Converts `(row, column, depth)` cell coordinates into positions.
//! All lengths are in ångström; the virtual helix axis runs along Z.
//!
//! | Grid | x | y |
//! |------|---|---|
//! | Honeycomb | `c·R·√3 + R` | `-((r + ⌊(r + 1 - c mod 2)/2⌋)·2R + 2R·(½ + ½·(c mod 2)))` |
//! | Square | `c·2R + R` | `-(r·2R + R)` |
//!
//! In both cases `z = depth · BASE_PAIR_RISE`.

use crate::{
    design::{lattice::Lattice, CellType},
    model::PlacedCell,
    Error, Point,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Radius of a virtual helix (Å)
pub const VHELIX_RADIUS: f64 = 10.0;
/// Rise per base pair along the helix axis (Å)
pub const BASE_PAIR_RISE: f64 = 3.32;
/// Twist per base pair (degrees)
pub const ROTATION_PER_BP: f64 = 34.3;
/// Radial displacement of a nucleotide from the helix axis, as a fraction of the radius
pub const NUCLEOTIDE_RADIAL_FRACTION: f64 = 0.8;
/// Column offset used to spread out inserted nucleotides
pub const INSERTION_COLUMN_OFFSET: i64 = 3;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Grid topology of a lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    Honeycomb,
    Square,
}

impl FromStr for GridType {
    type Err = Error;
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "honeycomb" => Ok(Self::Honeycomb),
            "square" => Ok(Self::Square),
            _ => Err(Error::InvalidGridType(tag.to_string())),
        }
    }
}

impl GridType {
    /// Un-recentred cell position in the lattice frame
    ///
    /// # Examples
    /// ~~~
    /// use unf::geometry::{GridType, BASE_PAIR_RISE, VHELIX_RADIUS};
    /// let p = GridType::Square.cell_position(0, 0, 2);
    /// assert_eq!(p.x, VHELIX_RADIUS);
    /// assert_eq!(p.y, -VHELIX_RADIUS);
    /// assert_eq!(p.z, 2.0 * BASE_PAIR_RISE);
    /// ~~~
    pub fn cell_position(&self, row: i64, column: i64, depth: i64) -> Point {
        const R: f64 = VHELIX_RADIUS;
        const DIAMETER: f64 = 2.0 * VHELIX_RADIUS;
        let z = depth as f64 * BASE_PAIR_RISE;
        match self {
            Self::Honeycomb => {
                let parity = column.rem_euclid(2);
                let shifted_row = row + (row + 1 - parity).div_euclid(2);
                Point::new(
                    column as f64 * R * SQRT_3 + R,
                    -(shifted_row as f64 * DIAMETER + DIAMETER * (0.5 + 0.5 * parity as f64)),
                    z,
                )
            }
            Self::Square => Point::new(
                column as f64 * DIAMETER + R,
                -(row as f64 * DIAMETER + R),
                z,
            ),
        }
    }
}

/// Unit direction from the helix axis to a nucleotide.
///
/// The phase is the helix' initial angle (radians) plus `ROTATION_PER_BP` per cell,
/// turned by half a revolution for the 3'→5' direction.
pub fn helical_direction(initial_angle: f64, cell_number: i64, reverse: bool) -> Point {
    let mut phase = initial_angle + (ROTATION_PER_BP * cell_number as f64).to_radians();
    if reverse {
        phase += std::f64::consts::PI;
    }
    Vector3::new(phase.cos(), phase.sin(), 0.0)
}

/// Cell position in the lattice frame: raw position minus the lattice' center of mass
pub fn local_position(row: i64, column: i64, depth: i64, lattice: &Lattice) -> Point {
    lattice.grid().cell_position(row, column, depth) - lattice.center_of_mass()
}

/// Absolute position of a lattice cell in rendering units.
///
/// The raw position is recentred on the lattice' active-cell center of mass,
/// moved into the lattice' absolute frame and scaled by `angstroms_per_unit`.
pub fn position(
    row: i64,
    column: i64,
    depth: i64,
    lattice: &Lattice,
    angstroms_per_unit: f64,
) -> Point {
    lattice.to_world(&local_position(row, column, depth, lattice)) / angstroms_per_unit
}

/// Average of the raw positions of the given cells, or the origin if there are none
pub fn center_of_mass(grid: GridType, cells: impl IntoIterator<Item = (i64, i64, i64)>) -> Point {
    let (sum, count) = cells
        .into_iter()
        .fold((Point::zeros(), 0usize), |(sum, count), (row, column, depth)| {
            (sum + grid.cell_position(row, column, depth), count + 1)
        });
    if count == 0 {
        Point::zeros()
    } else {
        sum / count as f64
    }
}

/// Place every cell slot `0..=last_cell` of every helix of every lattice.
///
/// Slots without a cell record are normal cells.
pub fn place_cells(lattices: &[Lattice], angstroms_per_unit: f64) -> Vec<PlacedCell> {
    let mut cells = Vec::new();
    for (index, lattice) in lattices.iter().enumerate() {
        for helix in lattice.helices() {
            cells.extend((0..=*helix.last_cell()).map(|number| PlacedCell {
                lattice: index,
                helix: *helix.id(),
                number,
                kind: helix.cell(number).map(|cell| *cell.kind()).unwrap_or(CellType::Normal),
                position: position(*helix.row(), *helix.column(), number, lattice, angstroms_per_unit),
                orientation: *lattice.orientation(),
            }));
        }
    }
    log::debug!("Placed {} lattice cell(s)", cells.len());
    cells
}
