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

//! End-to-end resolution of UNF containers.

mod common;

use approx::assert_relative_eq;
use float_cmp::assert_approx_eq;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::json;
use unf::design::MoleculeKind;
use unf::error::EntityKind;
use unf::model::PositionSource;
use unf::{
    Entity, Issue, MemoryFiles, Pipeline, Point, RemoteRepository, Renderer, Resolution,
    ResolveOptionsBuilder, UnitQuaternion,
};

/// Wrap a manifest into a container with one unrelated embedded file
fn container(manifest: serde_json::Value) -> String {
    format!("{}\n#INCLUDED_FILE notes.txt\nnothing here\n", manifest)
}

/// Resolve with one ångström per rendering unit
fn resolve(manifest: serde_json::Value, provider: MemoryFiles) -> Resolution {
    let options = ResolveOptionsBuilder::default()
        .angstroms_per_unit(1.0)
        .build()
        .unwrap();
    Pipeline::new(provider)
        .with_options(options)
        .unwrap()
        .run(&container(manifest))
        .unwrap()
}

fn strand(nucleotides: serde_json::Value) -> serde_json::Value {
    json!({
        "version": "1.0.0",
        "structures": [{
            "id": 0,
            "naStrands": [{
                "id": 4, "color": "#00ff00", "fivePrimeId": 1, "confFilesIds": [7],
                "nucleotides": nucleotides
            }]
        }]
    })
}

fn backbone(x: f64) -> serde_json::Value {
    json!([{"backboneCenter": [x, 0, 0]}])
}

#[derive(Default)]
struct Counter {
    cells: usize,
    nucleotides: usize,
    amino_acids: usize,
    atoms: usize,
    paths: Vec<(EntityKind, i64, usize)>,
}

impl Renderer for Counter {
    fn draw(&mut self, entity: Entity<'_>) {
        match entity {
            Entity::Cell(_) => self.cells += 1,
            Entity::Nucleotide { .. } => self.nucleotides += 1,
            Entity::AminoAcid { .. } => self.amino_acids += 1,
            Entity::Atom { .. } => self.atoms += 1,
        }
    }

    fn path(&mut self, kind: EntityKind, id: i64, points: &[Point], _color: Option<&str>) {
        self.paths.push((kind, id, points.len()));
    }
}

#[test]
fn two_cell_design() {
    common::init_logging();
    let resolution = Pipeline::new(MemoryFiles::default())
        .run_file(common::fixture("two_cells.unf"))
        .unwrap();
    assert!(resolution.report.is_empty(), "{:?}", resolution.report);
    assert_eq!(resolution.design.metadata().name(), "two cells");

    let scale = 256.0;
    let model = &resolution.model;
    assert_eq!(model.cells().len(), 2);
    assert_relative_eq!(
        model.cells()[0].position,
        Point::new(0.0, 0.0, -1.66) / scale,
        epsilon = 1e-12
    );

    // stored 3' first, walked from the 5' end
    let nucleotides = &model.strands()[0].nucleotides;
    let ids: Vec<i64> = nucleotides.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(nucleotides.iter().all(|n| n.source == PositionSource::Lattice));
    assert_relative_eq!(
        nucleotides[0].position,
        Point::new(8.0, 0.0, -1.66) / scale,
        epsilon = 1e-12
    );
    let phase = 34.3_f64.to_radians();
    assert_relative_eq!(
        nucleotides[1].position,
        Point::new(8.0 * phase.cos(), 8.0 * phase.sin(), 1.66) / scale,
        epsilon = 1e-12
    );
    assert_approx_eq!(
        f64,
        nucleotides[1].position.z - nucleotides[0].position.z,
        3.32 / scale,
        epsilon = 1e-12
    );
    let expected = UnitQuaternion::from_axis_angle(&Point::z_axis(), phase);
    assert_relative_eq!(nucleotides[1].orientation.unwrap(), expected, epsilon = 1e-12);

    // atoms of chain A only, recentred on each residue
    let residues = &model.chains()[0].residues;
    assert_eq!(residues.len(), 2);
    assert_eq!(residues[0].atoms.len(), 2);
    assert_relative_eq!(
        residues[0].atoms[0].position,
        Point::new(-1.0, 0.0, 20.0) / scale,
        epsilon = 1e-12
    );
    assert_relative_eq!(
        residues[0].atoms[1].position,
        Point::new(1.0, 0.0, 20.0) / scale,
        epsilon = 1e-12
    );
    assert_eq!(residues[1].atoms.len(), 1);
    assert_relative_eq!(
        residues[1].atoms[0].position,
        Point::new(3.8, 0.0, 20.0) / scale,
        epsilon = 1e-12
    );

    let mut counter = Counter::default();
    model.render(&mut counter);
    assert_eq!(counter.cells, 2);
    assert_eq!(counter.nucleotides, 2);
    assert_eq!(counter.amino_acids, 2);
    assert_eq!(counter.atoms, 3);
    assert_eq!(
        counter.paths,
        vec![(EntityKind::Strand, 0, 2), (EntityKind::Chain, 5, 2)]
    );
}

#[test]
fn explicit_coordinates_are_kept() {
    let nucleotides = json!([{
        "id": 1, "nbAbbrev": "G",
        "altPositions": [{
            "backboneCenter": [12.5, -3.25, 7.0],
            "nucleobaseCenter": [12.5, -3.25, 9.0],
            "baseNormal": [0, 0, 2],
            "hydrogenFaceDir": [1, 0, 0]
        }]
    }]);
    let resolution = resolve(strand(nucleotides), MemoryFiles::default());
    assert!(resolution.report.is_empty());
    let nucleotide = &resolution.model.strands()[0].nucleotides[0];
    assert_eq!(nucleotide.source, PositionSource::Explicit);
    assert_eq!(nucleotide.position, Point::new(12.5, -3.25, 7.0));
    assert_eq!(nucleotide.nucleobase, Some(Point::new(12.5, -3.25, 9.0)));
    assert_eq!(nucleotide.base_normal, Some(Point::z()));
    assert_relative_eq!(
        nucleotide.orientation.unwrap(),
        UnitQuaternion::identity(),
        epsilon = 1e-12
    );
}

#[test]
fn walk_follows_links_not_storage() {
    // stored as C, A, B
    let nucleotides = json!([
        {"id": 3, "nbAbbrev": "C", "next": -1, "altPositions": backbone(3.0)},
        {"id": 1, "nbAbbrev": "A", "next": 2, "altPositions": backbone(1.0)},
        {"id": 2, "nbAbbrev": "B", "next": 3, "altPositions": backbone(2.0)}
    ]);
    let resolution = resolve(strand(nucleotides), MemoryFiles::default());
    assert!(resolution.report.is_empty());
    let path = &resolution.model.strands()[0];
    let ids: Vec<i64> = path.nucleotides.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let xs: Vec<f64> = path.points().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![1.0, 2.0, 3.0]);
}

#[test]
fn cycle_is_reported() {
    let nucleotides = json!([
        {"id": 1, "next": 2, "altPositions": backbone(1.0)},
        {"id": 2, "next": 3, "altPositions": backbone(2.0)},
        {"id": 3, "next": 2, "altPositions": backbone(3.0)}
    ]);
    let resolution = resolve(strand(nucleotides), MemoryFiles::default());
    assert_eq!(
        resolution.report.issues(),
        &[Issue::CyclicChain {
            kind: EntityKind::Strand,
            chain: 4,
            id: 2
        }]
    );
    assert_eq!(resolution.model.strands()[0].nucleotides.len(), 3);
}

#[test]
fn trajectory_rows_place_nucleotides() {
    let nucleotides = json!([
        {"id": 1, "next": 2, "oxdnaConfRow": 1},
        {"id": 2, "next": -1}
    ]);
    let mut manifest = strand(nucleotides);
    manifest["externalFiles"] = json!([{"id": 7, "path": "sim/run.oxdna", "hash": ""}]);
    let trajectory = "t = 0\nb = 10 10 10\nE = 0 0 0\n\
        0 0 0 1 0 0 0 0 1 0 0 0 0 0 0\n\
        1 2 3 0 1 0 0 0 1 0 0 0 0 0 0\n";
    let resolution = resolve(manifest, MemoryFiles::default().with("run.oxdna", trajectory));

    assert_eq!(
        resolution.report.issues(),
        &[Issue::UnplaceableEntity {
            kind: EntityKind::Nucleotide,
            id: 2
        }]
    );
    let placed = &resolution.model.strands()[0].nucleotides;
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].source, PositionSource::Trajectory);
    assert_relative_eq!(
        placed[0].position,
        Point::new(1.0, 2.0, 3.0) * 8.518,
        epsilon = 1e-12
    );
    // backbone along y, normal along z
    let expected = UnitQuaternion::from_axis_angle(&Point::z_axis(), std::f64::consts::FRAC_PI_2);
    assert_relative_eq!(placed[0].orientation.unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn nanometer_design() {
    let manifest = json!({
        "version": "1.0.0",
        "lengthUnits": "nm",
        "structures": [{
            "id": 0,
            "aaChains": [{
                "id": 1, "chainName": "A", "nTerm": 1,
                "aminoAcids": [{"id": 1, "aaAbbrev": "LYS", "altPositions": [[1, 2, 3]]}]
            }]
        }]
    });
    let resolution = resolve(manifest, MemoryFiles::default());
    assert!(resolution.report.is_empty());
    let residue = &resolution.model.chains()[0].residues[0];
    assert_relative_eq!(residue.position, Point::new(10.0, 20.0, 30.0), epsilon = 1e-12);
    assert!(residue.atoms.is_empty());
}

/// Serves a single structure file
#[derive(Debug)]
struct Archive;

impl RemoteRepository for Archive {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, anyhow::Result<String>> {
        async move {
            match url {
                "https://archive.test/1abc.pdb" => Ok(format!(
                    "{}\n{}\n",
                    common::atom_line(1, "CA", 'A', 1, [0.0, 0.0, 0.0]),
                    common::atom_line(2, "CA", 'A', 2, [2.0, 0.0, 0.0])
                )),
                _ => anyhow::bail!("not found"),
            }
        }
        .boxed_local()
    }
}

#[test]
fn molecules() {
    let manifest = json!({
        "version": "1.0.0",
        "externalFiles": [{"id": 3, "path": "structures/1abc.pdb", "hash": ""}],
        "molecules": {
            "ligands": [{
                "id": 1, "name": "water",
                "atoms": [{"element": "O", "positions": [[1, 0, 0]]}],
                "positions": [[0, 0, 10]], "orientations": [[0, 0, 90]]
            }],
            "others": [
                {"id": 2, "name": "protein", "externalFileId": 3, "positions": [[5, 5, 5], [0, 0, 0]]},
                {"id": 4, "name": "ghost", "externalFileId": 9, "positions": [[0, 0, 0]]}
            ]
        }
    });
    let options = ResolveOptionsBuilder::default()
        .angstroms_per_unit(1.0)
        .remote_base_url("https://archive.test/")
        .build()
        .unwrap();
    let resolution = Pipeline::new(MemoryFiles::default())
        .with_options(options)
        .unwrap()
        .with_remote(Archive)
        .run(&container(manifest))
        .unwrap();

    assert_eq!(
        resolution.report.issues(),
        &[Issue::UnplaceableEntity {
            kind: EntityKind::Molecule,
            id: 4
        }]
    );
    let molecules = resolution.model.molecules();
    assert_eq!(molecules.len(), 3);

    let ligand = &molecules[0];
    assert_eq!(ligand.kind, MoleculeKind::Ligand);
    assert_eq!(ligand.atoms[0].element, "O");
    assert_relative_eq!(ligand.atoms[0].position, Point::new(0.0, 1.0, 10.0), epsilon = 1e-12);

    // one copy per placement, recentred on the bounding box
    assert!(molecules[1..].iter().all(|m| m.id == 2 && m.kind == MoleculeKind::Other));
    assert_eq!(molecules[1].placement, 0);
    assert_relative_eq!(molecules[1].atoms[0].position, Point::new(4.0, 5.0, 5.0), epsilon = 1e-12);
    assert_relative_eq!(molecules[1].atoms[1].position, Point::new(6.0, 5.0, 5.0), epsilon = 1e-12);
    assert_eq!(molecules[2].placement, 1);
    assert_relative_eq!(molecules[2].atoms[0].position, Point::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
}
