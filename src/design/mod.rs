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

//! # Design graph
//!
//! Typed, immutable representation of a manifest. Nucleotides and amino acids live
//! in flat arenas owned by the [`Design`]; strands and chains refer to contiguous
//! ranges in them and the `next` links are arena indices.
//!
//! All lengths are stored in ångström and all angles in radians; the declared
//! [`UnitSystem`] is applied once, while building the design.

pub mod external;
pub mod lattice;
pub(crate) mod manifest;
pub mod molecule;
pub mod protein;
pub mod strand;

use self::manifest::{RawAltPosition, RawChain, RawLattice, RawManifest, RawMolecule, RawStrand};
use crate::{
    geometry::GridType, units::UnitSystem, Error, Issue, Point, Report, ResolveOptions,
    UnitQuaternion,
};
use derive_getters::Getters;
pub use external::{ExternalFileRecord, FileFormat};
pub use lattice::{Cell, CellType, Lattice, VirtualHelix};
pub use molecule::{LigandAtom, Molecule, MoleculeKind, Placement};
pub use protein::{AminoAcid, Chain};
use std::collections::{hash_map::Entry, HashMap};
use std::ops::Range;
pub use strand::{Nucleotide, NucleotideOverride, Strand};

/// Arena member with a singly-linked successor
pub trait Linked {
    /// Manifest id
    fn key(&self) -> i64;
    /// Arena index of the successor
    fn successor(&self) -> Option<usize>;
}

/// Location of a nucleotide on a lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Index into [`Design::lattices`]
    pub lattice: usize,
    /// Index into [`Lattice::helices`]
    pub helix: usize,
    /// Index into [`VirtualHelix::cells`]
    pub cell: usize,
    /// Nucleotide belongs to the 3'→5' list
    pub reverse: bool,
    /// Position within the cell's list; non-zero for inserted nucleotides
    pub slot: usize,
}

/// Free-text design metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Metadata {
    name: String,
    author: String,
    creation_date: String,
    doi: String,
}

/// Group of strands and chains
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Structure {
    id: i64,
    name: String,
    /// Range in [`Design::strands`]
    strands: Range<usize>,
    /// Range in [`Design::chains`]
    chains: Range<usize>,
}

/// Root of a parsed design
#[derive(Debug, Clone, Default, Getters)]
pub struct Design {
    /// Declared format version
    version: String,
    units: UnitSystem,
    metadata: Metadata,
    external_files: Vec<ExternalFileRecord>,
    /// Lattices with a valid grid type
    lattices: Vec<Lattice>,
    structures: Vec<Structure>,
    strands: Vec<Strand>,
    nucleotides: Vec<Nucleotide>,
    chains: Vec<Chain>,
    amino_acids: Vec<AminoAcid>,
    molecules: Vec<Molecule>,
    /// Nucleotide id → lattice location
    cell_index: HashMap<i64, CellRef>,
    /// File id → index in `external_files`
    file_index: HashMap<i64, usize>,
}

impl Design {
    /// Build a design from manifest JSON.
    ///
    /// Only unparseable JSON is fatal. Version mismatches, invalid grid types,
    /// duplicate file ids and nucleotides referenced by several cells are pushed to
    /// `report` and the remaining data is still used.
    ///
    /// # Examples
    /// ~~~
    /// use unf::{Design, Report, ResolveOptions};
    /// let mut report = Report::default();
    /// let json = r#"{"version": "0.9", "name": "empty"}"#;
    /// let design = Design::from_manifest(json, &ResolveOptions::default(), &mut report).unwrap();
    /// assert_eq!(design.metadata().name(), "empty");
    /// assert_eq!(report.len(), 1);
    /// ~~~
    pub fn from_manifest(
        json: &str,
        options: &ResolveOptions,
        report: &mut Report,
    ) -> Result<Self, Error> {
        let raw: RawManifest = serde_json::from_str(json)?;

        let version = manifest::version_string(&raw.version);
        if version != options.supported_version {
            report.push(Issue::UnsupportedFormatVersion {
                found: version.clone(),
                expected: options.supported_version.clone(),
            });
        }
        let units = UnitSystem::from_tags(raw.length_units.as_deref(), raw.angular_units.as_deref());
        let metadata = Metadata {
            name: raw.name.unwrap_or_default(),
            author: raw.author.unwrap_or_default(),
            creation_date: raw.creation_date.unwrap_or_default(),
            doi: raw.doi.unwrap_or_default(),
        };
        log::info!(
            "Reading design '{}' by '{}' (version '{}')",
            metadata.name,
            metadata.author,
            version
        );

        let mut design = Self {
            version,
            units,
            metadata,
            ..Default::default()
        };
        design.add_external_files(raw.external_files, report);
        for raw_lattice in raw.lattices {
            design.add_lattice(raw_lattice, report);
        }
        design.index_cells(report);
        for raw_structure in raw.structures {
            let strands_start = design.strands.len();
            let chains_start = design.chains.len();
            for raw_strand in raw_structure.na_strands {
                design.add_strand(raw_strand);
            }
            for raw_chain in raw_structure.aa_chains {
                design.add_chain(raw_chain);
            }
            design.structures.push(Structure {
                id: raw_structure.id,
                name: raw_structure.name,
                strands: strands_start..design.strands.len(),
                chains: chains_start..design.chains.len(),
            });
        }
        for raw_molecule in raw.molecules.ligands {
            design.add_molecule(raw_molecule, MoleculeKind::Ligand);
        }
        for raw_molecule in raw.molecules.others {
            design.add_molecule(raw_molecule, MoleculeKind::Other);
        }
        log::info!(
            "Design has {} lattice(s), {} strand(s) with {} nucleotides, {} chain(s) with {} residues, {} molecule(s) and {} external file(s)",
            design.lattices.len(),
            design.strands.len(),
            design.nucleotides.len(),
            design.chains.len(),
            design.amino_acids.len(),
            design.molecules.len(),
            design.file_index.len()
        );
        Ok(design)
    }

    /// External file record by id
    pub fn file(&self, id: i64) -> Option<&ExternalFileRecord> {
        self.file_index.get(&id).map(|&index| &self.external_files[index])
    }

    /// External file records with unique ids, in manifest order
    pub fn unique_files(&self) -> impl Iterator<Item = &ExternalFileRecord> {
        self.external_files
            .iter()
            .enumerate()
            .filter(|(index, record)| self.file_index.get(record.id()) == Some(index))
            .map(|(_, record)| record)
    }

    /// Declared members of a strand, in storage order
    pub fn strand_nucleotides(&self, strand: &Strand) -> &[Nucleotide] {
        &self.nucleotides[strand.nucleotides().clone()]
    }

    /// Declared members of a chain, in storage order
    pub fn chain_amino_acids(&self, chain: &Chain) -> &[AminoAcid] {
        &self.amino_acids[chain.amino_acids().clone()]
    }

    /// Lattice, helix and cell holding a nucleotide
    pub fn locate(&self, nucleotide_id: i64) -> Option<(CellRef, &Lattice, &VirtualHelix, &Cell)> {
        let cell_ref = *self.cell_index.get(&nucleotide_id)?;
        let lattice = self.lattices.get(cell_ref.lattice)?;
        let helix = lattice.helices().get(cell_ref.helix)?;
        let cell = helix.cells().get(cell_ref.cell)?;
        Some((cell_ref, lattice, helix, cell))
    }

    fn add_external_files(&mut self, raw: Vec<manifest::RawExternalFile>, report: &mut Report) {
        for raw_file in raw {
            let index = self.external_files.len();
            match self.file_index.entry(raw_file.id) {
                Entry::Occupied(_) => report.push(Issue::DuplicateFileId { id: raw_file.id }),
                Entry::Vacant(entry) => {
                    entry.insert(index);
                }
            }
            self.external_files.push(ExternalFileRecord::new(
                raw_file.id,
                raw_file.path,
                raw_file.hash,
                raw_file.is_included,
            ));
        }
    }

    /// Add a lattice; one with an unknown grid type is reported and left out
    fn add_lattice(&mut self, raw: RawLattice, report: &mut Report) {
        let grid = match raw.grid.parse::<GridType>() {
            Ok(grid) => grid,
            Err(err) => {
                log::debug!("{}", err);
                report.push(Issue::InvalidGridType {
                    lattice: raw.name,
                    grid: raw.grid,
                });
                return;
            }
        };
        let helices = raw
            .virtual_helices
            .into_iter()
            .map(|raw_helix| {
                let cells = raw_helix
                    .cells
                    .into_iter()
                    .map(|raw_cell| {
                        Cell::new(
                            raw_cell.number,
                            CellType::from_tag(&raw_cell.kind),
                            raw_cell.five_to_three_nts,
                            raw_cell.three_to_five_nts,
                        )
                    })
                    .collect();
                let grid_position = &raw_helix.lattice_position;
                VirtualHelix::new(
                    raw_helix.id,
                    grid_position.first().copied().unwrap_or_default(),
                    grid_position.get(1).copied().unwrap_or_default(),
                    self.units.radians(raw_helix.initial_angle),
                    raw_helix.last_cell,
                    cells,
                )
            })
            .collect();
        let position = self
            .units
            .vector_from_slice(&raw.position)
            .unwrap_or_else(Point::zeros);
        let orientation = self
            .units
            .orientation_from_slice(&raw.orientation)
            .unwrap_or_else(UnitQuaternion::identity);
        let lattice = Lattice::new(raw.name, grid, position, orientation, helices);
        log::debug!(
            "Lattice '{}' ({:?}) with {} helices and {} active cells",
            lattice.name(),
            grid,
            lattice.helices().len(),
            lattice.active_cell_count()
        );
        self.lattices.push(lattice);
    }

    /// Map every nucleotide id to its cell; the first reference wins
    fn index_cells(&mut self, report: &mut Report) {
        for (lattice_index, lattice) in self.lattices.iter().enumerate() {
            for (helix_index, helix) in lattice.helices().iter().enumerate() {
                for (cell_index, cell) in helix.cells().iter().enumerate() {
                    let directions = [(false, cell.forward()), (true, cell.reverse())];
                    for (reverse, ids) in directions {
                        for (slot, &id) in ids.iter().enumerate() {
                            match self.cell_index.entry(id) {
                                Entry::Occupied(_) => {
                                    report.push(Issue::OrphanedCellReference { id })
                                }
                                Entry::Vacant(entry) => {
                                    entry.insert(CellRef {
                                        lattice: lattice_index,
                                        helix: helix_index,
                                        cell: cell_index,
                                        reverse,
                                        slot,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn add_strand(&mut self, raw: RawStrand) {
        let strand_index = self.strands.len();
        let offset = self.nucleotides.len();
        let members: HashMap<i64, usize> = raw
            .nucleotides
            .iter()
            .enumerate()
            .map(|(i, nucleotide)| (nucleotide.id, offset + i))
            .collect();
        for raw_nucleotide in raw.nucleotides {
            let next = raw_nucleotide.next.and_then(|id| members.get(&id).copied());
            if next.is_none() && raw_nucleotide.next.is_some() {
                log::debug!(
                    "Nucleotide #{} links to a non-member of strand #{}",
                    raw_nucleotide.id,
                    raw.id
                );
            }
            let alt_position = self.nucleotide_override(&raw_nucleotide.alt_positions);
            self.nucleotides.push(Nucleotide::new(
                raw_nucleotide.id,
                raw_nucleotide.nb_abbrev,
                next,
                strand_index,
                raw_nucleotide.oxdna_conf_row.map(|row| row as usize),
                alt_position,
            ));
        }
        let five_prime = raw.five_prime_id.and_then(|id| members.get(&id).copied());
        self.strands.push(Strand::new(
            raw.id,
            raw.na_type,
            raw.color,
            raw.is_scaffold,
            raw.five_prime_id,
            five_prime,
            raw.conf_files_ids,
            offset..self.nucleotides.len(),
        ));
    }

    fn add_chain(&mut self, raw: RawChain) {
        let offset = self.amino_acids.len();
        let members: HashMap<i64, usize> = raw
            .amino_acids
            .iter()
            .enumerate()
            .map(|(i, amino_acid)| (amino_acid.id, offset + i))
            .collect();
        for raw_amino_acid in raw.amino_acids {
            let position = match raw_amino_acid.alt_positions.first() {
                Some(RawAltPosition::Point(values)) => self.units.vector_from_slice(values),
                _ => None,
            };
            self.amino_acids.push(AminoAcid::new(
                raw_amino_acid.id,
                raw_amino_acid.aa_abbrev,
                raw_amino_acid.next.and_then(|id| members.get(&id).copied()),
                raw_amino_acid.pdb_id,
                position,
            ));
        }
        let n_term = raw.n_term.and_then(|id| members.get(&id).copied());
        self.chains.push(Chain::new(
            raw.id,
            raw.chain_name,
            raw.color,
            raw.pdb_file_id,
            raw.n_term,
            n_term,
            offset..self.amino_acids.len(),
        ));
    }

    fn add_molecule(&mut self, raw: RawMolecule, kind: MoleculeKind) {
        let atoms = raw
            .atoms
            .iter()
            .filter_map(|atom| {
                let position = self.units.vector_from_slice(atom.positions.first()?)?;
                Some(LigandAtom::new(atom.element.clone(), position))
            })
            .collect();
        let placements = raw
            .positions
            .iter()
            .enumerate()
            .filter_map(|(i, position)| {
                let position = self.units.vector_from_slice(position)?;
                let orientation = raw
                    .orientations
                    .get(i)
                    .and_then(|angles| self.units.orientation_from_slice(angles))
                    .unwrap_or_else(UnitQuaternion::identity);
                Some(Placement {
                    position,
                    orientation,
                })
            })
            .collect();
        self.molecules.push(Molecule::new(
            raw.id,
            raw.name,
            kind,
            raw.external_file_id,
            atoms,
            placements,
        ));
    }

    /// Explicit nucleotide coordinates; placeholders and short lists give `None`
    fn nucleotide_override(&self, alt_positions: &[RawAltPosition]) -> Option<NucleotideOverride> {
        match alt_positions.first()? {
            RawAltPosition::Nucleotide(raw) => {
                let vector = |values: &[f64]| self.units.vector_from_slice(values);
                let direction = |values: &[f64]| {
                    UnitSystem::default()
                        .vector_from_slice(values)
                        .and_then(|v| v.try_normalize(f64::EPSILON))
                };
                Some(NucleotideOverride::new(
                    vector(raw.backbone_center.as_slice())?,
                    vector(raw.nucleobase_center.as_slice()),
                    direction(raw.base_normal.as_slice()),
                    direction(raw.hydrogen_face_dir.as_slice()),
                ))
            }
            RawAltPosition::Point(values) => Some(NucleotideOverride::new(
                self.units.vector_from_slice(values)?,
                None,
                None,
                None,
            )),
        }
    }
}
