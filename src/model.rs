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

//! # Resolved model
//!
//! Output of the pipeline. All positions are absolute and in rendering units,
//! i.e. ångström divided by `angstroms_per_unit`.

use crate::{design::CellType, design::MoleculeKind, error::EntityKind, Point, UnitQuaternion};

/// One slot of a virtual helix
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    /// Index of the lattice in the design
    pub lattice: usize,
    /// Virtual helix id
    pub helix: i64,
    pub number: i64,
    pub kind: CellType,
    /// Position of the helix axis at this cell
    pub position: Point,
    /// Lattice orientation; the helix axis is the local Z
    pub orientation: UnitQuaternion,
}

/// How a nucleotide position was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    /// Coordinates given in the manifest
    Explicit,
    /// Row of a trajectory file
    Trajectory,
    /// Derived from the owning lattice cell
    Lattice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNucleotide {
    pub id: i64,
    pub base: String,
    /// Backbone center
    pub position: Point,
    pub nucleobase: Option<Point>,
    /// Unit base normal
    pub base_normal: Option<Point>,
    /// Unit hydrogen-face direction
    pub hydrogen_face: Option<Point>,
    pub orientation: Option<UnitQuaternion>,
    pub source: PositionSource,
}

/// Placed nucleotides of a strand, from the 5' to the 3' end
#[derive(Debug, Clone, PartialEq)]
pub struct StrandPath {
    pub id: i64,
    pub color: String,
    pub is_scaffold: bool,
    pub nucleotides: Vec<PlacedNucleotide>,
}

impl StrandPath {
    pub fn points(&self) -> Vec<Point> {
        self.nucleotides.iter().map(|n| n.position).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAtom {
    pub name: String,
    pub element: String,
    pub position: Point,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedResidue {
    pub id: i64,
    pub abbrev: String,
    pub position: Point,
    /// Atoms selected from the chain's structure file
    pub atoms: Vec<PlacedAtom>,
}

/// Placed residues of a protein chain, from the N- to the C-terminus
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPath {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub residues: Vec<PlacedResidue>,
}

impl ChainPath {
    pub fn points(&self) -> Vec<Point> {
        self.residues.iter().map(|r| r.position).collect()
    }
}

/// One placement of a molecule
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMolecule {
    pub id: i64,
    pub name: String,
    pub kind: MoleculeKind,
    /// Index of the placement within the molecule
    pub placement: usize,
    pub atoms: Vec<PlacedAtom>,
}

/// Display color hint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color<'a> {
    /// Color string from the manifest, e.g. `#ff0000`
    Hex(&'a str),
    /// Element color in `[0, 1]`
    Rgb([f32; 3]),
}

/// A resolved entity handed to a [`Renderer`]
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Cell(&'a PlacedCell),
    Nucleotide {
        strand: &'a StrandPath,
        nucleotide: &'a PlacedNucleotide,
    },
    AminoAcid {
        chain: &'a ChainPath,
        residue: &'a PlacedResidue,
    },
    Atom {
        /// Residue or molecule holding the atom
        owner: EntityKind,
        owner_id: i64,
        atom: &'a PlacedAtom,
    },
}

impl<'a> Entity<'a> {
    pub fn position(&self) -> Point {
        match self {
            Self::Cell(cell) => cell.position,
            Self::Nucleotide { nucleotide, .. } => nucleotide.position,
            Self::AminoAcid { residue, .. } => residue.position,
            Self::Atom { atom, .. } => atom.position,
        }
    }

    pub fn orientation(&self) -> Option<UnitQuaternion> {
        match self {
            Self::Cell(cell) => Some(cell.orientation),
            Self::Nucleotide { nucleotide, .. } => nucleotide.orientation,
            Self::AminoAcid { .. } | Self::Atom { .. } => None,
        }
    }

    pub fn color(&self) -> Option<Color<'a>> {
        match *self {
            Self::Cell(_) => None,
            Self::Nucleotide { strand, .. } => Some(Color::Hex(strand.color.as_str())),
            Self::AminoAcid { chain, .. } => Some(Color::Hex(chain.color.as_str())),
            Self::Atom { atom, .. } => Some(Color::Rgb(atom.color)),
        }
    }
}

/// Consumer of resolved entities; the model never queries it
pub trait Renderer {
    fn draw(&mut self, entity: Entity<'_>);

    /// Ordered backbone of a strand or chain
    fn path(&mut self, _kind: EntityKind, _id: i64, _points: &[Point], _color: Option<&str>) {}
}

/// Positioned design, ready for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedModel {
    pub(crate) cells: Vec<PlacedCell>,
    pub(crate) strands: Vec<StrandPath>,
    pub(crate) chains: Vec<ChainPath>,
    pub(crate) molecules: Vec<PlacedMolecule>,
}

impl ResolvedModel {
    pub fn cells(&self) -> &[PlacedCell] {
        &self.cells
    }

    pub fn strands(&self) -> &[StrandPath] {
        &self.strands
    }

    pub fn chains(&self) -> &[ChainPath] {
        &self.chains
    }

    pub fn molecules(&self) -> &[PlacedMolecule] {
        &self.molecules
    }

    /// Hand every entity to a renderer
    pub fn render(&self, renderer: &mut impl Renderer) {
        for cell in &self.cells {
            renderer.draw(Entity::Cell(cell));
        }
        for strand in self.strands.iter().filter(|s| !s.nucleotides.is_empty()) {
            renderer.path(EntityKind::Strand, strand.id, &strand.points(), Some(strand.color.as_str()));
            for nucleotide in &strand.nucleotides {
                renderer.draw(Entity::Nucleotide { strand, nucleotide });
            }
        }
        for chain in self.chains.iter().filter(|c| !c.residues.is_empty()) {
            renderer.path(EntityKind::Chain, chain.id, &chain.points(), Some(chain.color.as_str()));
            for residue in &chain.residues {
                renderer.draw(Entity::AminoAcid { chain, residue });
                for atom in &residue.atoms {
                    renderer.draw(Entity::Atom {
                        owner: EntityKind::AminoAcid,
                        owner_id: residue.id,
                        atom,
                    });
                }
            }
        }
        for molecule in &self.molecules {
            for atom in &molecule.atoms {
                renderer.draw(Entity::Atom {
                    owner: EntityKind::Molecule,
                    owner_id: molecule.id,
                    atom,
                });
            }
        }
    }
}
