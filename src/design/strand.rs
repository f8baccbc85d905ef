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

//! Nucleic-acid strands and nucleotides

use super::Linked;
use crate::Point;
use derive_getters::Getters;
use std::ops::Range;

/// Explicit coordinates of a nucleotide (Å); these take precedence over the lattice
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NucleotideOverride {
    backbone_center: Point,
    nucleobase_center: Option<Point>,
    base_normal: Option<Point>,
    hydrogen_face_dir: Option<Point>,
}

impl NucleotideOverride {
    pub fn new(
        backbone_center: Point,
        nucleobase_center: Option<Point>,
        base_normal: Option<Point>,
        hydrogen_face_dir: Option<Point>,
    ) -> Self {
        Self {
            backbone_center,
            nucleobase_center,
            base_normal,
            hydrogen_face_dir,
        }
    }
}

/// A nucleotide stored in the design's arena
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Nucleotide {
    id: i64,
    /// Nucleobase abbreviation, e.g. `A`
    base: String,
    /// Arena index of the 3' neighbour
    next: Option<usize>,
    /// Arena index of the owning strand
    strand: usize,
    /// Row in the strand's trajectory file
    oxdna_row: Option<usize>,
    alt_position: Option<NucleotideOverride>,
}

impl Nucleotide {
    pub fn new(
        id: i64,
        base: impl Into<String>,
        next: Option<usize>,
        strand: usize,
        oxdna_row: Option<usize>,
        alt_position: Option<NucleotideOverride>,
    ) -> Self {
        Self {
            id,
            base: base.into(),
            next,
            strand,
            oxdna_row,
            alt_position,
        }
    }
}

impl Linked for Nucleotide {
    fn key(&self) -> i64 {
        self.id
    }
    fn successor(&self) -> Option<usize> {
        self.next
    }
}

/// An ordered nucleic-acid polymer
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Strand {
    id: i64,
    /// Nucleic-acid type, e.g. `DNA`
    na_type: String,
    color: String,
    is_scaffold: bool,
    /// Declared id of the 5' terminus
    five_prime_id: Option<i64>,
    /// Arena index of the 5' terminus, if it is a member of this strand
    five_prime: Option<usize>,
    /// External trajectory files describing this strand
    conf_files: Vec<i64>,
    /// Arena range of the members (storage order)
    nucleotides: Range<usize>,
}

impl Strand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        na_type: impl Into<String>,
        color: impl Into<String>,
        is_scaffold: bool,
        five_prime_id: Option<i64>,
        five_prime: Option<usize>,
        conf_files: Vec<i64>,
        nucleotides: Range<usize>,
    ) -> Self {
        Self {
            id,
            na_type: na_type.into(),
            color: color.into(),
            is_scaffold,
            five_prime_id,
            five_prime,
            conf_files,
            nucleotides,
        }
    }

    /// Number of declared members
    pub fn len(&self) -> usize {
        self.nucleotides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nucleotides.is_empty()
    }
}
