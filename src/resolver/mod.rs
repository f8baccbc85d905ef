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

//! # Dependency resolution
//!
//! Every unique record of the external file table becomes one unit of
//! asynchronous work. The units are scattered with [`join_all`] and run
//! interleaved on the calling thread; their outcomes are gathered once all of them
//! have completed. Each unit owns its key of the resulting [`ExternalMap`].
//!
//! Content is looked up, in order, in
//! 1. the container's embedded files (records marked as included; by path, then file name),
//! 2. the caller's [`FileProvider`] (by file name),
//! 3. the [`RemoteRepository`] (molecule files only).

mod hash;
mod source;

pub use hash::{content_hash, hashes_match};
pub use source::{FileProvider, LocalFiles, MemoryFiles, RemoteRepository};

use crate::{
    design::{ExternalFileRecord, FileFormat},
    AtomRecord, Container, Design, Issue, MoleculeReader, ParticleRecord, Report,
    ResolveOptions, TrajectoryReader,
};
use futures::future::join_all;
use itertools::{Either, Itertools};
use std::collections::HashMap;

/// Parsed content of an external file
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExternal {
    Molecule(Vec<AtomRecord>),
    Trajectory(Vec<ParticleRecord>),
}

impl ResolvedExternal {
    pub fn atoms(&self) -> Option<&[AtomRecord]> {
        match self {
            Self::Molecule(atoms) => Some(atoms),
            Self::Trajectory(_) => None,
        }
    }

    pub fn particles(&self) -> Option<&[ParticleRecord]> {
        match self {
            Self::Trajectory(particles) => Some(particles),
            Self::Molecule(_) => None,
        }
    }
}

/// File id → parsed content
pub type ExternalMap = HashMap<i64, ResolvedExternal>;

/// A successfully loaded unit: id, data and any non-blocking warnings
type Loaded = (i64, ResolvedExternal, Vec<Issue>);

/// Collaborators used to resolve the external file table
pub struct DependencyResolver<'a> {
    pub options: &'a ResolveOptions,
    pub container: &'a Container,
    pub provider: &'a dyn FileProvider,
    pub remote: Option<&'a dyn RemoteRepository>,
    pub molecule_reader: &'a dyn MoleculeReader,
    pub trajectory_reader: &'a dyn TrajectoryReader,
}

impl DependencyResolver<'_> {
    /// Resolve every unique external file of a design.
    ///
    /// Completes when all units have completed. Omitted files are reported and absent
    /// from the returned map.
    pub async fn resolve(&self, design: &Design) -> (ExternalMap, Report) {
        let units = design.unique_files().map(|record| self.resolve_one(record));
        let outcomes = join_all(units).await;
        let (loaded, omitted): (Vec<Loaded>, Vec<Issue>) =
            outcomes.into_iter().partition_map(|outcome| match outcome {
                Ok(loaded) => Either::Left(loaded),
                Err(issue) => Either::Right(issue),
            });

        let mut report = Report::default();
        let mut map = ExternalMap::with_capacity(loaded.len());
        for (id, data, warnings) in loaded {
            warnings.into_iter().for_each(|issue| report.push(issue));
            map.insert(id, data);
        }
        omitted.into_iter().for_each(|issue| report.push(issue));
        log::info!(
            "Resolved {} external file(s), {} omitted",
            map.len(),
            report.count(is_omission)
        );
        (map, report)
    }

    async fn resolve_one(&self, record: &ExternalFileRecord) -> Result<Loaded, Issue> {
        let id = *record.id();
        let format = record.format().ok_or_else(|| Issue::UnsupportedFileFormat {
            id,
            path: record.path().clone(),
            extension: record.extension().to_string(),
        })?;
        let content = self.fetch(record, format).await?;

        let mut warnings = Vec::new();
        if self.options.verify_hashes && !record.hash().trim().is_empty() {
            let computed = content_hash(&content);
            log::debug!("File #{} has content hash {}", id, computed);
            if !hashes_match(record.hash(), &computed) {
                warnings.push(Issue::HashMismatch {
                    id,
                    expected: record.hash().clone(),
                    computed,
                });
            }
        }

        let unresolved = |reason: String| Issue::UnresolvedExternalFile {
            id,
            path: record.path().clone(),
            reason,
        };
        let data = match format {
            FileFormat::Molecule => self
                .molecule_reader
                .read_molecule(&content)
                .map(ResolvedExternal::Molecule),
            FileFormat::Trajectory => self
                .trajectory_reader
                .read_trajectory(&content)
                .map(ResolvedExternal::Trajectory),
        }
        .map_err(|err| unresolved(format!("{:#}", err)))?;
        Ok((id, data, warnings))
    }

    /// Obtain raw content from the first source that has it
    async fn fetch(&self, record: &ExternalFileRecord, format: FileFormat) -> Result<String, Issue> {
        let id = *record.id();
        let file_name = record.file_name();
        let unresolved = |reason: String| Issue::UnresolvedExternalFile {
            id,
            path: record.path().clone(),
            reason,
        };

        if *record.is_included() {
            return self
                .container
                .file(record.path())
                .or_else(|| self.container.file(file_name))
                .map(str::to_string)
                .ok_or_else(|| Issue::MissingIncludedFile {
                    id,
                    path: record.path().clone(),
                });
        }
        if self.provider.contains(file_name) {
            return self
                .provider
                .load(file_name)
                .await
                .map_err(|err| unresolved(format!("{:#}", err)));
        }
        match (format, self.remote) {
            (FileFormat::Molecule, Some(remote)) => {
                let url = self.options.remote_url(file_name);
                log::info!("Fetching file #{} from {}", id, url);
                remote
                    .fetch(&url)
                    .await
                    .map_err(|err| unresolved(format!("{}: {:#}", url, err)))
            }
            (FileFormat::Molecule, None) => Err(unresolved(
                "not supplied and no remote repository is configured".to_string(),
            )),
            (FileFormat::Trajectory, _) => Err(unresolved("not supplied".to_string())),
        }
    }
}

/// True for issues that leave a file id out of the map
pub fn is_omission(issue: &Issue) -> bool {
    matches!(
        issue,
        Issue::MissingIncludedFile { .. }
            | Issue::UnresolvedExternalFile { .. }
            | Issue::UnsupportedFileFormat { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{OxDnaReader, PdbReader};
    use futures::executor::block_on;
    use futures::future::FutureExt;
    use futures::future::LocalBoxFuture;

    const PDB: &str =
        "ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C\n";
    const OXDNA: &str = "t = 0\nb = 1 1 1\nE = 0 0 0\n0 0 0 1 0 0 0 0 1 0 0 0 0 0 0\n";

    struct Remote;

    impl RemoteRepository for Remote {
        fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, anyhow::Result<String>> {
            async move {
                if url.ends_with("1ABC.pdb") {
                    Ok(PDB.to_string())
                } else {
                    anyhow::bail!("404 Not Found")
                }
            }
            .boxed_local()
        }
    }

    fn design(files: &str) -> Design {
        let json = format!(r#"{{"version": "1.0.0", "externalFiles": [{}]}}"#, files);
        let mut report = Report::default();
        Design::from_manifest(&json, &ResolveOptions::default(), &mut report).unwrap()
    }

    fn resolve(
        design: &Design,
        container: &Container,
        provider: &dyn FileProvider,
        remote: Option<&dyn RemoteRepository>,
    ) -> (ExternalMap, Report) {
        let options = ResolveOptions::default();
        let resolver = DependencyResolver {
            options: &options,
            container,
            provider,
            remote,
            molecule_reader: &PdbReader,
            trajectory_reader: &OxDnaReader,
        };
        block_on(resolver.resolve(design))
    }

    #[test]
    fn included_by_path_or_name() {
        let hash = content_hash(PDB);
        let design = design(&format!(
            r#"{{"id": 1, "path": "sub/dir/a.pdb", "hash": "{hash}", "isIncluded": true}},
               {{"id": 2, "path": "b.oxdna", "hash": "{}", "isIncluded": true}},
               {{"id": 3, "path": "c.pdb", "hash": "", "isIncluded": true}}"#,
            content_hash(OXDNA)
        ));
        let container = Container::split(&format!(
            "{{}}\n#INCLUDED_FILE sub/dir/a.pdb\n{PDB}#INCLUDED_FILE b.oxdna\n{OXDNA}"
        ))
        .unwrap();
        let (map, report) = resolve(&design, &container, &MemoryFiles::default(), Some(&Remote));
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1].atoms().unwrap().len(), 1);
        assert_eq!(map[&2].particles().unwrap().len(), 1);
        // included files never fall back to other sources
        assert_eq!(
            report.issues(),
            &[Issue::MissingIncludedFile {
                id: 3,
                path: "c.pdb".into()
            }]
        );
    }

    #[test]
    fn hash_mismatch_keeps_data() {
        let design = design(r#"{"id": 5, "path": "a.pdb", "hash": "0000", "isIncluded": false}"#);
        let provider = MemoryFiles::default().with("a.pdb", PDB);
        let (map, report) = resolve(&design, &Container::default(), &provider, None);
        assert!(map.contains_key(&5));
        assert_eq!(
            report.issues(),
            &[Issue::HashMismatch {
                id: 5,
                expected: "0000".into(),
                computed: content_hash(PDB),
            }]
        );
    }

    #[test]
    fn remote_fallback_only_for_molecules() {
        let design = design(
            r#"{"id": 1, "path": "1ABC.pdb", "hash": "", "isIncluded": false},
               {"id": 2, "path": "9XYZ.pdb", "hash": "", "isIncluded": false},
               {"id": 3, "path": "sim.oxdna", "hash": "", "isIncluded": false},
               {"id": 4, "path": "notes.txt", "hash": "", "isIncluded": false}"#,
        );
        let (map, report) = resolve(&design, &Container::default(), &MemoryFiles::default(), Some(&Remote));
        assert_eq!(map.keys().copied().sorted().collect_vec(), vec![1]);
        assert_eq!(report.count(is_omission), 3);
        assert!(report.issues().iter().any(|issue| matches!(
            issue,
            Issue::UnresolvedExternalFile { id: 2, reason, .. } if reason.contains("404")
        )));
        assert!(report.issues().contains(&Issue::UnsupportedFileFormat {
            id: 4,
            path: "notes.txt".into(),
            extension: "txt".into()
        }));
    }

    #[test]
    fn reader_failure_omits_file() {
        let design = design(r#"{"id": 1, "path": "bad.pdb", "hash": "", "isIncluded": false}"#);
        let provider = MemoryFiles::default().with("bad.pdb", "ATOM   short");
        let (map, report) = resolve(&design, &Container::default(), &provider, None);
        assert!(map.is_empty());
        assert_eq!(report.count(is_omission), 1);
    }
}
