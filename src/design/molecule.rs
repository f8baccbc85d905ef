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

//! Free molecules placed in the design

use crate::{Point, UnitQuaternion};
use derive_getters::Getters;

/// Origin of a molecule's atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeKind {
    /// Atoms listed inline in the manifest
    Ligand,
    /// Atoms read from an external molecule file
    Other,
}

/// Inline ligand atom, relative to the molecule origin (Å)
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct LigandAtom {
    element: String,
    position: Point,
}

impl LigandAtom {
    pub fn new(element: impl Into<String>, position: Point) -> Self {
        Self {
            element: element.into(),
            position,
        }
    }
}

/// One copy of a molecule in the absolute frame
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Translation (Å)
    pub position: Point,
    pub orientation: UnitQuaternion,
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Molecule {
    id: i64,
    name: String,
    kind: MoleculeKind,
    external_file_id: Option<i64>,
    atoms: Vec<LigandAtom>,
    placements: Vec<Placement>,
}

impl Molecule {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        kind: MoleculeKind,
        external_file_id: Option<i64>,
        atoms: Vec<LigandAtom>,
        placements: Vec<Placement>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            external_file_id,
            atoms,
            placements,
        }
    }
}
