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

//! Serde image of the JSON manifest.
//!
//! Only consumed fields are modelled; everything else is ignored. Every collection
//! defaults to empty so that an empty object is a valid (empty) manifest.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawManifest {
    pub version: Option<serde_json::Value>,
    pub length_units: Option<String>,
    pub angular_units: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub creation_date: Option<String>,
    pub doi: Option<String>,
    pub external_files: Vec<RawExternalFile>,
    pub lattices: Vec<RawLattice>,
    pub structures: Vec<RawStructure>,
    pub molecules: RawMolecules,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawExternalFile {
    pub id: i64,
    pub path: String,
    pub hash: String,
    pub is_included: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawLattice {
    pub name: String,
    #[serde(rename = "type")]
    pub grid: String,
    pub position: Vec<f64>,
    pub orientation: Vec<f64>,
    pub virtual_helices: Vec<RawVirtualHelix>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawVirtualHelix {
    pub id: i64,
    #[serde(deserialize_with = "deserialize_integers")]
    pub lattice_position: Vec<i64>,
    pub initial_angle: f64,
    pub last_cell: Option<i64>,
    pub cells: Vec<RawCell>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawCell {
    pub number: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "deserialize_integers")]
    pub five_to_three_nts: Vec<i64>,
    #[serde(deserialize_with = "deserialize_integers")]
    pub three_to_five_nts: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawStructure {
    pub id: i64,
    pub name: String,
    pub na_strands: Vec<RawStrand>,
    pub aa_chains: Vec<RawChain>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawStrand {
    pub id: i64,
    pub na_type: String,
    pub color: String,
    pub is_scaffold: bool,
    #[serde(deserialize_with = "deserialize_link")]
    pub five_prime_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_integers")]
    pub conf_files_ids: Vec<i64>,
    pub nucleotides: Vec<RawNucleotide>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawNucleotide {
    pub id: i64,
    pub nb_abbrev: String,
    #[serde(deserialize_with = "deserialize_link")]
    pub next: Option<i64>,
    #[serde(deserialize_with = "deserialize_link")]
    pub oxdna_conf_row: Option<i64>,
    pub alt_positions: Vec<RawAltPosition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawChain {
    pub id: i64,
    pub chain_name: String,
    pub color: String,
    #[serde(deserialize_with = "deserialize_link")]
    pub pdb_file_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_link")]
    pub n_term: Option<i64>,
    pub amino_acids: Vec<RawAminoAcid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawAminoAcid {
    pub id: i64,
    pub aa_abbrev: String,
    #[serde(deserialize_with = "deserialize_link")]
    pub next: Option<i64>,
    #[serde(deserialize_with = "deserialize_link")]
    pub pdb_id: Option<i64>,
    pub alt_positions: Vec<RawAltPosition>,
}

/// Alternative position record.
///
/// Nucleotides use an object with four vectors, amino acids a bare coordinate list;
/// older writers emit empty lists as placeholders.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawAltPosition {
    Nucleotide(RawNucleotidePosition),
    Point(Vec<f64>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNucleotidePosition {
    pub backbone_center: Vec<f64>,
    #[serde(default)]
    pub nucleobase_center: Vec<f64>,
    #[serde(default)]
    pub base_normal: Vec<f64>,
    #[serde(default)]
    pub hydrogen_face_dir: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawMolecules {
    pub ligands: Vec<RawMolecule>,
    pub others: Vec<RawMolecule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawMolecule {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "deserialize_link")]
    pub external_file_id: Option<i64>,
    pub atoms: Vec<RawLigandAtom>,
    pub positions: Vec<Vec<f64>>,
    pub orientations: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawLigandAtom {
    pub element: String,
    pub positions: Vec<Vec<f64>>,
}

/// Deserialize an optional id where negative values and `null` mean "absent".
fn deserialize_link<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<i64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|id| *id >= 0))
}

/// Deserialize a list of integers that some writers emit as floats (`[0.0, 1.0]`)
fn deserialize_integers<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<f64> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|value| value.round() as i64).collect())
}

/// Render the manifest version, which may be a string or a number
pub(crate) fn version_string(version: &Option<serde_json::Value>) -> String {
    match version {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
