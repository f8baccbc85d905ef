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

//! Placement of molecules and atom groups

use crate::{
    design::{Molecule, MoleculeKind},
    error::EntityKind,
    model::{PlacedAtom, PlacedMolecule},
    AtomRecord, Design, ExternalMap, Issue, Point, Report, UnitQuaternion,
};

/// Center of the axis-aligned bounding box of a set of points
pub fn bounding_box_center<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Point> {
    let mut points = points.into_iter();
    let first = *points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
    Some((min + max) * 0.5)
}

/// Recentre atoms on their bounding-box center, rotate, translate (Å) and scale
pub fn place_atoms(
    atoms: &[&AtomRecord],
    position: &Point,
    orientation: &UnitQuaternion,
    angstroms_per_unit: f64,
) -> Vec<PlacedAtom> {
    let Some(center) = bounding_box_center(atoms.iter().map(|atom| &atom.position)) else {
        return Vec::new();
    };
    atoms
        .iter()
        .map(|atom| PlacedAtom {
            name: atom.name.clone(),
            element: atom.element.clone(),
            position: (orientation * (atom.position - center) + position) / angstroms_per_unit,
            color: atom.color,
        })
        .collect()
}

/// Ligand atom color
const LIGAND_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

/// Place every copy of every molecule.
///
/// Ligand atoms are given relative to the molecule origin; atoms of other molecules
/// come from their external file and are recentred first. A molecule whose file was
/// not resolved is reported.
pub fn place_molecules(
    design: &Design,
    externals: &ExternalMap,
    angstroms_per_unit: f64,
    report: &mut Report,
) -> Vec<PlacedMolecule> {
    let mut placed = Vec::new();
    for molecule in design.molecules() {
        match molecule.kind() {
            MoleculeKind::Ligand => {
                placed.extend(place_ligand(molecule, angstroms_per_unit));
            }
            MoleculeKind::Other => {
                let atoms = molecule
                    .external_file_id()
                    .and_then(|id| externals.get(&id))
                    .and_then(|data| data.atoms());
                let Some(atoms) = atoms else {
                    report.push(Issue::UnplaceableEntity {
                        kind: EntityKind::Molecule,
                        id: *molecule.id(),
                    });
                    continue;
                };
                let atoms: Vec<&AtomRecord> = atoms.iter().collect();
                placed.extend(molecule.placements().iter().enumerate().map(|(i, placement)| {
                    PlacedMolecule {
                        id: *molecule.id(),
                        name: molecule.name().clone(),
                        kind: MoleculeKind::Other,
                        placement: i,
                        atoms: place_atoms(
                            &atoms,
                            &placement.position,
                            &placement.orientation,
                            angstroms_per_unit,
                        ),
                    }
                }));
            }
        }
    }
    log::debug!("Placed {} molecule copies", placed.len());
    placed
}

fn place_ligand(molecule: &Molecule, angstroms_per_unit: f64) -> Vec<PlacedMolecule> {
    molecule
        .placements()
        .iter()
        .enumerate()
        .map(|(i, placement)| PlacedMolecule {
            id: *molecule.id(),
            name: molecule.name().clone(),
            kind: MoleculeKind::Ligand,
            placement: i,
            atoms: molecule
                .atoms()
                .iter()
                .map(|atom| PlacedAtom {
                    name: atom.element().clone(),
                    element: atom.element().clone(),
                    position: (placement.orientation * atom.position() + placement.position)
                        / angstroms_per_unit,
                    color: LIGAND_COLOR,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::euler_xyz;
    use approx::assert_relative_eq;

    fn atom(x: f64, y: f64, z: f64) -> AtomRecord {
        AtomRecord {
            serial: 1,
            name: "CA".into(),
            residue_name: "GLY".into(),
            chain_id: "A".into(),
            residue_seq: 1,
            element: "C".into(),
            position: Point::new(x, y, z),
            color: [0.5, 0.5, 0.5],
        }
    }

    #[test]
    fn box_center() {
        let points = [Point::new(0.0, 0.0, 0.0), Point::new(4.0, -2.0, 1.0), Point::new(1.0, 2.0, 9.0)];
        assert_eq!(bounding_box_center(&points), Some(Point::new(2.0, 0.0, 4.5)));
        assert_eq!(bounding_box_center(&[]), None);
    }

    #[test]
    fn recentre_rotate_translate() {
        let atoms = [atom(10.0, 0.0, 0.0), atom(12.0, 0.0, 0.0)];
        let refs: Vec<&AtomRecord> = atoms.iter().collect();
        let rotation = euler_xyz(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let placed = place_atoms(&refs, &Point::new(0.0, 0.0, 8.0), &rotation, 2.0);
        assert_eq!(placed.len(), 2);
        // centered at x = 11, rotated onto -y/+y, lifted to z = 8, halved
        assert_relative_eq!(placed[0].position, Point::new(0.0, -0.5, 4.0), epsilon = 1e-12);
        assert_relative_eq!(placed[1].position, Point::new(0.0, 0.5, 4.0), epsilon = 1e-12);
        assert!(place_atoms(&[], &Point::zeros(), &rotation, 1.0).is_empty());
    }
}
