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

//! # Resolution of Unified Nanotechnology Format designs
//!
//! A UNF container holds a JSON manifest describing a nanostructure design
//! (lattices of virtual helices, nucleic-acid strands, protein chains and molecules)
//! followed by optionally embedded auxiliary files. This crate turns such a container
//! into a [`ResolvedModel`] where every cell, nucleotide, amino acid and atom has an
//! absolute position, ready to be handed to a [`Renderer`].
//!
//! The pipeline is:
//!
//! 1. [`container`] splits the text into the manifest and embedded files.
//! 2. [`design`] builds the typed, immutable [`Design`] graph.
//! 3. [`geometry`] places lattice cells (no external data needed).
//! 4. [`resolver`] loads all external files concurrently and verifies their hashes.
//! 5. [`linearize`] and [`placement`] walk chains and place molecules once every
//!    external file has been resolved.
//!
//! # Examples
//! ~~~
//! use unf::{MemoryFiles, Pipeline};
//!
//! let text = r#"{"version": "1.0.0", "lengthUnits": "A", "angularUnits": "deg"}"#;
//! let resolution = Pipeline::new(MemoryFiles::default()).run(text).unwrap();
//! assert!(resolution.model.strands().is_empty());
//! ~~~

use nalgebra::Vector3;

pub type Point = Vector3<f64>;
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

pub mod config;
pub mod container;
pub mod design;
pub mod error;
pub mod geometry;
pub mod io;
pub mod linearize;
pub mod model;
pub mod pipeline;
pub mod placement;
pub mod resolver;
pub mod units;

pub use config::{ResolveOptions, ResolveOptionsBuilder};
pub use container::Container;
pub use design::Design;
pub use error::{Error, Issue, Report};
pub use io::{AtomRecord, MoleculeReader, ParticleRecord, TrajectoryReader};
pub use model::{Entity, Renderer, ResolvedModel};
pub use pipeline::{Pipeline, Resolution};
pub use resolver::{
    ExternalMap, FileProvider, LocalFiles, MemoryFiles, RemoteRepository, ResolvedExternal,
};
pub use units::{AngleUnit, LengthUnit, UnitSystem};
