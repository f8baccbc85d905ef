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

//! # Chain linearization
//!
//! Walks strands from the 5' end and protein chains from the N-terminus and places
//! every member. Nucleotides are placed from, in order of priority,
//!
//! 1. explicit coordinates in the manifest,
//! 2. a row of a trajectory file referenced by the strand,
//! 3. the owning lattice cell.
//!
//! Members without any source are reported and left out of the path.

use crate::{
    design::{AminoAcid, Chain, Design, Linked, Nucleotide, Strand},
    error::EntityKind,
    geometry::{self, INSERTION_COLUMN_OFFSET, NUCLEOTIDE_RADIAL_FRACTION, VHELIX_RADIUS},
    io::ParticleRecord,
    model::{ChainPath, PlacedAtom, PlacedNucleotide, PlacedResidue, PositionSource, StrandPath},
    placement, ExternalMap, Issue, Point, Report, ResolveOptions, UnitQuaternion,
};
use nalgebra::{Rotation3, Vector3};
use std::collections::HashSet;
use std::ops::Range;

/// Iterator over arena indices following successor links from a start member.
///
/// Stops at the end of the chain, at a link leaving `members`, or at the first
/// revisited member, which is then available from [`ChainWalk::revisited`].
///
/// # Examples
/// ~~~
/// use unf::design::Nucleotide;
/// use unf::linearize::ChainWalk;
/// let arena = vec![
///     Nucleotide::new(1, "A", Some(1), 0, None, None),
///     Nucleotide::new(2, "C", Some(2), 0, None, None),
///     Nucleotide::new(3, "G", None, 0, None, None),
/// ];
/// let order: Vec<usize> = ChainWalk::new(&arena, 0..3, Some(0)).collect();
/// assert_eq!(order, vec![0, 1, 2]);
/// ~~~
#[derive(Debug)]
pub struct ChainWalk<'a, T: Linked> {
    arena: &'a [T],
    members: Range<usize>,
    current: Option<usize>,
    visited: HashSet<usize>,
    revisited: Option<usize>,
}

impl<'a, T: Linked> ChainWalk<'a, T> {
    pub fn new(arena: &'a [T], members: Range<usize>, start: Option<usize>) -> Self {
        Self {
            arena,
            members,
            current: start,
            visited: HashSet::new(),
            revisited: None,
        }
    }

    /// Member at which a cycle was detected
    pub fn revisited(&self) -> Option<usize> {
        self.revisited
    }

    /// Number of distinct members visited so far
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

impl<T: Linked> Iterator for ChainWalk<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.current.take()?;
        if !self.members.contains(&index) {
            return None;
        }
        if !self.visited.insert(index) {
            self.revisited = Some(index);
            return None;
        }
        self.current = self.arena.get(index).and_then(Linked::successor);
        Some(index)
    }
}

/// Ordered member indices of a strand or chain.
///
/// A missing terminus, a cycle and unreachable members are reported; the members
/// visited before a cycle are still returned.
pub fn ordered_members<T: Linked>(
    arena: &[T],
    members: Range<usize>,
    start: Option<usize>,
    start_id: Option<i64>,
    kind: EntityKind,
    chain: i64,
    report: &mut Report,
) -> Vec<usize> {
    if members.is_empty() {
        return Vec::new();
    }
    if start.is_none() {
        report.push(Issue::MissingTerminus {
            kind,
            chain,
            id: start_id.unwrap_or(-1),
        });
        return Vec::new();
    }
    let mut walk = ChainWalk::new(arena, members.clone(), start);
    let order: Vec<usize> = walk.by_ref().collect();
    if let Some(index) = walk.revisited() {
        report.push(Issue::CyclicChain {
            kind,
            chain,
            id: arena[index].key(),
        });
    }
    let unreached = members.len() - walk.visited();
    if unreached > 0 {
        report.push(Issue::UnreachedEntities {
            kind,
            chain,
            count: unreached,
        });
    }
    order
}

/// Orientation with the given local X and Z axes, or `None` for degenerate input
pub fn frame(x: &Point, z: &Point) -> Option<UnitQuaternion> {
    let z = z.try_normalize(f64::EPSILON)?;
    let x = (x - z * x.dot(&z)).try_normalize(f64::EPSILON)?;
    let y = z.cross(&x);
    let rotation = Rotation3::from_basis_unchecked(&[x, y, z]);
    Some(UnitQuaternion::from_rotation_matrix(&rotation))
}

/// Places strands and chains of a design once external files are resolved
#[derive(Debug, Clone, Copy)]
pub struct Linearizer<'a> {
    pub design: &'a Design,
    pub externals: &'a ExternalMap,
    pub options: &'a ResolveOptions,
}

impl Linearizer<'_> {
    pub fn strands(&self, report: &mut Report) -> Vec<StrandPath> {
        self.design
            .strands()
            .iter()
            .map(|strand| self.strand(strand, report))
            .collect()
    }

    pub fn chains(&self, report: &mut Report) -> Vec<ChainPath> {
        self.design
            .chains()
            .iter()
            .map(|chain| self.chain(chain, report))
            .collect()
    }

    /// Placed nucleotides of a strand from the 5' end
    pub fn strand(&self, strand: &Strand, report: &mut Report) -> StrandPath {
        let arena = self.design.nucleotides();
        let order = ordered_members(
            arena,
            strand.nucleotides().clone(),
            *strand.five_prime(),
            *strand.five_prime_id(),
            EntityKind::Strand,
            *strand.id(),
            report,
        );
        let trajectory = strand
            .conf_files()
            .iter()
            .find_map(|id| self.externals.get(id).and_then(|data| data.particles()));

        let nucleotides: Vec<_> = order
            .into_iter()
            .filter_map(|index| {
                let nucleotide = &arena[index];
                let placed = self.place_nucleotide(nucleotide, trajectory);
                if placed.is_none() {
                    report.push(Issue::UnplaceableEntity {
                        kind: EntityKind::Nucleotide,
                        id: *nucleotide.id(),
                    });
                }
                placed
            })
            .collect();
        log::debug!(
            "Strand #{}: {} of {} nucleotides placed",
            strand.id(),
            nucleotides.len(),
            strand.len()
        );
        StrandPath {
            id: *strand.id(),
            color: strand.color().clone(),
            is_scaffold: *strand.is_scaffold(),
            nucleotides,
        }
    }

    /// Placed residues of a chain from the N-terminus
    pub fn chain(&self, chain: &Chain, report: &mut Report) -> ChainPath {
        let arena = self.design.amino_acids();
        let order = ordered_members(
            arena,
            chain.amino_acids().clone(),
            *chain.n_term(),
            *chain.n_term_id(),
            EntityKind::Chain,
            *chain.id(),
            report,
        );
        let atoms = chain
            .pdb_file_id()
            .and_then(|id| self.externals.get(&id))
            .and_then(|data| data.atoms());

        let residues = order
            .into_iter()
            .filter_map(|index| {
                let amino_acid = &arena[index];
                let placed = self.place_residue(chain, amino_acid, atoms);
                if placed.is_none() {
                    report.push(Issue::UnplaceableEntity {
                        kind: EntityKind::AminoAcid,
                        id: *amino_acid.id(),
                    });
                }
                placed
            })
            .collect();
        ChainPath {
            id: *chain.id(),
            name: chain.name().clone(),
            color: chain.color().clone(),
            residues,
        }
    }

    fn place_nucleotide(
        &self,
        nucleotide: &Nucleotide,
        trajectory: Option<&[ParticleRecord]>,
    ) -> Option<PlacedNucleotide> {
        let scale = self.options.angstroms_per_unit;
        let mut placed = PlacedNucleotide {
            id: *nucleotide.id(),
            base: nucleotide.base().clone(),
            position: Point::zeros(),
            nucleobase: None,
            base_normal: None,
            hydrogen_face: None,
            orientation: None,
            source: PositionSource::Explicit,
        };

        if let Some(alt) = nucleotide.alt_position() {
            placed.position = alt.backbone_center() / scale;
            placed.nucleobase = alt.nucleobase_center().map(|p| p / scale);
            placed.base_normal = *alt.base_normal();
            placed.hydrogen_face = *alt.hydrogen_face_dir();
            placed.orientation = match (alt.hydrogen_face_dir(), alt.base_normal()) {
                (Some(x), Some(z)) => frame(x, z),
                _ => None,
            };
            return Some(placed);
        }

        if let Some(particle) = nucleotide
            .oxdna_row()
            .and_then(|row| trajectory.and_then(|particles| particles.get(row)))
        {
            placed.position = particle.position * self.options.oxdna_length_unit / scale;
            placed.base_normal = particle.normal.try_normalize(f64::EPSILON);
            placed.orientation = frame(&particle.backbone, &particle.normal);
            placed.source = PositionSource::Trajectory;
            return Some(placed);
        }

        let (position, orientation) = self.lattice_placement(*nucleotide.id())?;
        placed.position = position / scale;
        placed.orientation = Some(orientation);
        placed.source = PositionSource::Lattice;
        Some(placed)
    }

    /// Absolute position (Å) and orientation of a nucleotide from its lattice cell.
    ///
    /// The k-th nucleotide of a cell direction is shifted by `k` cells along the
    /// helix and by a fixed number of columns, both in the direction of travel.
    pub fn lattice_placement(&self, nucleotide_id: i64) -> Option<(Point, UnitQuaternion)> {
        let (cell_ref, lattice, helix, cell) = self.design.locate(nucleotide_id)?;
        let sign = if cell_ref.reverse { -1 } else { 1 };
        let (mut column, mut depth) = (*helix.column(), *cell.number());
        if cell_ref.slot > 0 {
            column += sign * INSERTION_COLUMN_OFFSET;
            depth += sign * cell_ref.slot as i64;
        }
        let direction =
            geometry::helical_direction(*helix.initial_angle(), *cell.number(), cell_ref.reverse);
        let local = geometry::local_position(*helix.row(), column, depth, lattice)
            + direction * (NUCLEOTIDE_RADIAL_FRACTION * VHELIX_RADIUS);
        let phase = direction.y.atan2(direction.x);
        let orientation =
            lattice.orientation() * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), phase);
        Some((lattice.to_world(&local), orientation))
    }

    fn place_residue(
        &self,
        chain: &Chain,
        amino_acid: &AminoAcid,
        atoms: Option<&[crate::AtomRecord]>,
    ) -> Option<PlacedResidue> {
        let position = (*amino_acid.position())?;
        let scale = self.options.angstroms_per_unit;
        let atoms: Vec<PlacedAtom> = match (atoms, amino_acid.pdb_id()) {
            (Some(atoms), Some(pdb_id)) => {
                let selected: Vec<_> = atoms
                    .iter()
                    .filter(|atom| atom.chain_id == *chain.name() && atom.residue_seq == *pdb_id)
                    .collect();
                placement::place_atoms(&selected, &position, &UnitQuaternion::identity(), scale)
            }
            _ => Vec::new(),
        };
        Some(PlacedResidue {
            id: *amino_acid.id(),
            abbrev: amino_acid.abbrev().clone(),
            position: position / scale,
            atoms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::AminoAcid;
    use approx::assert_relative_eq;

    fn nucleotide(id: i64, next: Option<usize>) -> Nucleotide {
        Nucleotide::new(id, "A", next, 0, None, None)
    }

    #[test]
    fn walk_in_link_order() {
        // stored as C, A, B; linked A → B → C
        let arena = vec![
            nucleotide(3, None),
            nucleotide(1, Some(2)),
            nucleotide(2, Some(0)),
        ];
        let mut report = Report::default();
        let order = ordered_members(&arena, 0..3, Some(1), Some(1), EntityKind::Strand, 7, &mut report);
        assert_eq!(order, vec![1, 2, 0]);
        assert!(report.is_empty());
    }

    #[test]
    fn cycle_is_detected() {
        let arena = vec![
            nucleotide(1, Some(1)),
            nucleotide(2, Some(2)),
            nucleotide(3, Some(1)),
        ];
        let mut walk = ChainWalk::new(&arena, 0..3, Some(0));
        assert_eq!(walk.by_ref().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(walk.revisited(), Some(1));

        let mut report = Report::default();
        let order = ordered_members(&arena, 0..3, Some(0), Some(1), EntityKind::Strand, 7, &mut report);
        assert_eq!(order.len(), 3);
        assert_eq!(
            report.issues(),
            &[Issue::CyclicChain {
                kind: EntityKind::Strand,
                chain: 7,
                id: 2
            }]
        );
    }

    #[test]
    fn unreached_and_missing_terminus() {
        let arena = vec![
            AminoAcid::new(1, "GLY", None, None, None),
            AminoAcid::new(2, "ALA", None, None, None),
        ];
        let mut report = Report::default();
        let order = ordered_members(&arena, 0..2, Some(0), Some(1), EntityKind::Chain, 4, &mut report);
        assert_eq!(order, vec![0]);
        assert_eq!(
            report.issues(),
            &[Issue::UnreachedEntities {
                kind: EntityKind::Chain,
                chain: 4,
                count: 1
            }]
        );

        let mut report = Report::default();
        assert!(ordered_members(&arena, 0..2, None, Some(99), EntityKind::Chain, 4, &mut report).is_empty());
        assert_eq!(
            report.issues(),
            &[Issue::MissingTerminus {
                kind: EntityKind::Chain,
                chain: 4,
                id: 99
            }]
        );

        let mut report = Report::default();
        assert!(ordered_members(&arena, 0..0, None, None, EntityKind::Chain, 4, &mut report).is_empty());
        assert!(report.is_empty());
    }

    #[test]
    fn orthonormal_frame() {
        let q = frame(&Point::new(2.0, 0.0, 0.5), &Point::new(0.0, 0.0, 3.0)).unwrap();
        assert_relative_eq!(q * Point::x(), Point::x(), epsilon = 1e-12);
        assert_relative_eq!(q * Point::z(), Point::z(), epsilon = 1e-12);
        let q = frame(&Point::y(), &Point::x()).unwrap();
        assert_relative_eq!(q * Point::z(), Point::x(), epsilon = 1e-12);
        assert_relative_eq!(q * Point::x(), Point::y(), epsilon = 1e-12);
        assert!(frame(&Point::z(), &Point::z()).is_none());
        assert!(frame(&Point::x(), &Point::zeros()).is_none());
    }
}
