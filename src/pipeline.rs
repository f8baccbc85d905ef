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

//! # Resolution pipeline
//!
//! Container → design → lattice cells, then all external files are resolved
//! concurrently. Chains and molecules are placed only after every file unit has
//! completed.

use crate::{
    container::EMPTY_MANIFEST,
    geometry,
    io::{OxDnaReader, PdbReader},
    linearize::Linearizer,
    placement,
    resolver::DependencyResolver,
    Container, Design, Error, FileProvider, Issue, MoleculeReader, RemoteRepository, Report,
    ResolveOptions, ResolvedModel, TrajectoryReader,
};
use derive_more::Debug;
use std::path::Path;
use validator::Validate;

/// Outcome of a resolution: the design, its positioned model and all reported issues
#[derive(Debug)]
pub struct Resolution {
    pub design: Design,
    pub model: ResolvedModel,
    pub report: Report,
}

/// Resolves UNF containers with a set of collaborators
///
/// # Examples
/// ~~~
/// use unf::{MemoryFiles, Pipeline, ResolveOptionsBuilder};
/// let options = ResolveOptionsBuilder::default().angstroms_per_unit(1.0).build().unwrap();
/// let pipeline = Pipeline::new(MemoryFiles::default()).with_options(options).unwrap();
/// let resolution = pipeline.run("{\"version\": \"1.0.0\"}\n#INCLUDED_FILE none.txt\n").unwrap();
/// assert!(resolution.report.is_empty());
/// ~~~
#[derive(Debug)]
pub struct Pipeline {
    options: ResolveOptions,
    #[debug(skip)]
    provider: Box<dyn FileProvider>,
    #[debug(skip)]
    remote: Option<Box<dyn RemoteRepository>>,
    molecule_reader: Box<dyn MoleculeReader>,
    trajectory_reader: Box<dyn TrajectoryReader>,
}

impl Pipeline {
    /// Pipeline with default options and readers and no remote repository
    pub fn new(provider: impl FileProvider + 'static) -> Self {
        Self {
            options: ResolveOptions::default(),
            provider: Box::new(provider),
            remote: None,
            molecule_reader: Box::new(PdbReader),
            trajectory_reader: Box::new(OxDnaReader),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Result<Self, Error> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn with_remote(mut self, remote: impl RemoteRepository + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    pub fn with_molecule_reader(mut self, reader: impl MoleculeReader + 'static) -> Self {
        self.molecule_reader = Box::new(reader);
        self
    }

    pub fn with_trajectory_reader(mut self, reader: impl TrajectoryReader + 'static) -> Self {
        self.trajectory_reader = Box::new(reader);
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve a container on the current thread
    pub fn run(&self, text: &str) -> Result<Resolution, Error> {
        futures::executor::block_on(self.run_async(text))
    }

    /// Read and resolve a container file
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<Resolution, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(e, path))?;
        log::info!("Resolving {}", path.display());
        self.run(&text)
    }

    /// Resolve a container.
    ///
    /// Fails only if the manifest of a well-formed container is not valid JSON.
    pub async fn run_async(&self, text: &str) -> Result<Resolution, Error> {
        let mut report = Report::default();
        let (container, malformed) = match Container::split(text) {
            Ok(container) => (container, false),
            Err(err) => {
                log::debug!("{}; reading the whole text as manifest", err);
                report.push(Issue::MalformedContainer);
                (Container::from_manifest(text), true)
            }
        };
        let design = match Design::from_manifest(container.manifest(), &self.options, &mut report) {
            Ok(design) => design,
            Err(err) if malformed => {
                log::warn!("{}; using an empty manifest", err);
                Design::from_manifest(EMPTY_MANIFEST, &self.options, &mut report)?
            }
            Err(err) => return Err(err),
        };
        let scale = self.options.angstroms_per_unit;
        let cells = geometry::place_cells(design.lattices(), scale);

        let resolver = DependencyResolver {
            options: &self.options,
            container: &container,
            provider: self.provider.as_ref(),
            remote: self.remote.as_deref(),
            molecule_reader: self.molecule_reader.as_ref(),
            trajectory_reader: self.trajectory_reader.as_ref(),
        };
        let (externals, resolver_report) = resolver.resolve(&design).await;
        report.merge(resolver_report);

        let linearizer = Linearizer {
            design: &design,
            externals: &externals,
            options: &self.options,
        };
        let strands = linearizer.strands(&mut report);
        let chains = linearizer.chains(&mut report);
        let molecules = placement::place_molecules(&design, &externals, scale, &mut report);
        let model = ResolvedModel {
            cells,
            strands,
            chains,
            molecules,
        };
        log::info!(
            "Resolved '{}' with {} issue(s)",
            design.metadata().name(),
            report.len()
        );
        Ok(Resolution {
            design,
            model,
            report,
        })
    }
}
