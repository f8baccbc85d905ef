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

//! # Errors and non-blocking issues
//!
//! [`Error`] halts the affected branch of the resolution, whereas an [`Issue`]
//! only degrades one record, file or entity. Issues are collected in a [`Report`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed container: no '{}' marker found", crate::container::MARKER)]
    MalformedContainer,

    #[error("cannot parse manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid grid type '{0}'")]
    InvalidGridType(String),

    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options: {0}")]
    Options(#[from] validator::ValidationErrors),
}

impl Error {
    pub fn from_io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Kind of entity that could not be placed or walked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Nucleotide,
    AminoAcid,
    Strand,
    Chain,
    Molecule,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nucleotide => "nucleotide",
            Self::AminoAcid => "amino acid",
            Self::Strand => "strand",
            Self::Chain => "chain",
            Self::Molecule => "molecule",
        };
        f.write_str(name)
    }
}

/// Non-blocking conditions reported while resolving a design
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Issue {
    #[error("container has no embedded-file marker")]
    MalformedContainer,

    #[error("unsupported format version '{found}', expected '{expected}'")]
    UnsupportedFormatVersion { found: String, expected: String },

    #[error("file #{id} ('{path}') is marked as included but missing from the container")]
    MissingIncludedFile { id: i64, path: String },

    #[error("hash of file #{id} does not match: expected {expected}, computed {computed}")]
    HashMismatch {
        id: i64,
        expected: String,
        computed: String,
    },

    #[error("file #{id} ('{path}') could not be resolved: {reason}")]
    UnresolvedExternalFile { id: i64, path: String, reason: String },

    #[error("file #{id} ('{path}') has no reader for extension '{extension}'")]
    UnsupportedFileFormat {
        id: i64,
        path: String,
        extension: String,
    },

    #[error("duplicate external file id #{id}; keeping the first record")]
    DuplicateFileId { id: i64 },

    #[error("{kind} #{id} has no position source")]
    UnplaceableEntity { kind: EntityKind, id: i64 },

    #[error("invalid grid type '{grid}' in lattice '{lattice}'")]
    InvalidGridType { lattice: String, grid: String },

    #[error("nucleotide #{id} is referenced by more than one cell; keeping the first")]
    OrphanedCellReference { id: i64 },

    #[error("{kind} #{chain} revisits #{id}; traversal stopped")]
    CyclicChain { kind: EntityKind, chain: i64, id: i64 },

    #[error("{kind} #{chain} has no member with terminus id #{id}")]
    MissingTerminus { kind: EntityKind, chain: i64, id: i64 },

    #[error("{kind} #{chain}: {count} declared members are unreachable from the terminus")]
    UnreachedEntities {
        kind: EntityKind,
        chain: i64,
        count: usize,
    },
}

/// Ordered collection of issues
///
/// Every issue is logged as a warning when pushed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    pub fn push(&mut self, issue: Issue) {
        log::warn!("{}", issue);
        self.issues.push(issue);
    }

    /// Append issues from another report without logging them again
    pub fn merge(&mut self, other: Report) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Count issues matching a predicate
    pub fn count(&self, predicate: impl Fn(&Issue) -> bool) -> usize {
        self.issues.iter().filter(|issue| predicate(issue)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_messages() {
        let issue = Issue::UnplaceableEntity {
            kind: EntityKind::AminoAcid,
            id: 12,
        };
        assert_eq!(issue.to_string(), "amino acid #12 has no position source");

        let issue = Issue::OrphanedCellReference { id: 3 };
        assert!(issue.to_string().contains("more than one cell"));
    }

    #[test]
    fn report_counts() {
        let mut report = Report::default();
        assert!(report.is_empty());
        report.push(Issue::MalformedContainer);
        report.push(Issue::OrphanedCellReference { id: 1 });
        report.push(Issue::OrphanedCellReference { id: 2 });
        assert_eq!(report.len(), 3);
        assert_eq!(
            report.count(|i| matches!(i, Issue::OrphanedCellReference { .. })),
            2
        );

        let mut other = Report::default();
        other.push(Issue::DuplicateFileId { id: 7 });
        report.merge(other);
        assert_eq!(report.issues().last(), Some(&Issue::DuplicateFileId { id: 7 }));
    }

    #[test]
    fn grid_error_message() {
        let err = Error::InvalidGridType("hexagon".into());
        assert_eq!(err.to_string(), "invalid grid type 'hexagon'");
    }
}
