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

//! Protein chains and amino acids

use super::Linked;
use crate::Point;
use derive_getters::Getters;
use std::ops::Range;

/// Residue of a protein chain
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct AminoAcid {
    id: i64,
    /// Three- or one-letter abbreviation
    abbrev: String,
    /// Arena index of the C-terminal neighbour
    next: Option<usize>,
    /// Residue sequence number in the chain's structure file
    pdb_id: Option<i64>,
    /// Explicit position (Å); required for placement
    position: Option<Point>,
}

impl AminoAcid {
    pub fn new(
        id: i64,
        abbrev: impl Into<String>,
        next: Option<usize>,
        pdb_id: Option<i64>,
        position: Option<Point>,
    ) -> Self {
        Self {
            id,
            abbrev: abbrev.into(),
            next,
            pdb_id,
            position,
        }
    }
}

impl Linked for AminoAcid {
    fn key(&self) -> i64 {
        self.id
    }
    fn successor(&self) -> Option<usize> {
        self.next
    }
}

/// Ordered protein polymer
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Chain {
    id: i64,
    /// Chain identifier used in the structure file
    name: String,
    color: String,
    /// Structure file holding the residue atoms
    pdb_file_id: Option<i64>,
    n_term_id: Option<i64>,
    /// Arena index of the N-terminus, if it is a member of this chain
    n_term: Option<usize>,
    amino_acids: Range<usize>,
}

impl Chain {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        color: impl Into<String>,
        pdb_file_id: Option<i64>,
        n_term_id: Option<i64>,
        n_term: Option<usize>,
        amino_acids: Range<usize>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            pdb_file_id,
            n_term_id,
            n_term,
            amino_acids,
        }
    }

    pub fn len(&self) -> usize {
        self.amino_acids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amino_acids.is_empty()
    }
}
