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

//! Readers for external molecule and trajectory files.
//!
//! The resolver only sees the record types defined here; the byte-level parsing
//! sits behind [`MoleculeReader`] and [`TrajectoryReader`] and can be replaced.

mod oxdna;
mod pdb;

pub use oxdna::OxDnaReader;
pub use pdb::PdbReader;

use crate::Point;

/// Atom of a molecule file
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub serial: i64,
    /// Atom name, e.g. `CA`
    pub name: String,
    pub residue_name: String,
    pub chain_id: String,
    pub residue_seq: i64,
    /// Element symbol, e.g. `C`
    pub element: String,
    /// Position (Å)
    pub position: Point,
    /// RGB color in `[0, 1]`
    pub color: [f32; 3],
}

/// One row of an oxDNA configuration (oxDNA length units)
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    pub position: Point,
    /// Backbone-base versor
    pub backbone: Point,
    /// Base normal versor
    pub normal: Point,
    pub velocity: Point,
    pub angular_velocity: Point,
}

/// Turns molecule file content into atom records
pub trait MoleculeReader: std::fmt::Debug {
    fn read_molecule(&self, content: &str) -> anyhow::Result<Vec<AtomRecord>>;
}

/// Turns trajectory file content into particle records, one per configuration row
pub trait TrajectoryReader: std::fmt::Debug {
    fn read_trajectory(&self, content: &str) -> anyhow::Result<Vec<ParticleRecord>>;
}
