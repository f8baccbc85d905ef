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

//! Fixed-column PDB reader for `ATOM` and `HETATM` records.

use super::{AtomRecord, MoleculeReader};
use crate::Point;
use anyhow::Context;

/// Reads `ATOM`/`HETATM` records and colors atoms by element
#[derive(Debug, Clone, Copy, Default)]
pub struct PdbReader;

impl MoleculeReader for PdbReader {
    fn read_molecule(&self, content: &str) -> anyhow::Result<Vec<AtomRecord>> {
        let atoms = content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.starts_with("ATOM") || line.starts_with("HETATM"))
            .map(|(index, line)| {
                parse_atom(line).with_context(|| format!("PDB line {}", index + 1))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        log::debug!("Read {} atom(s) from PDB content", atoms.len());
        Ok(atoms)
    }
}

/// Trimmed column range; missing columns give an empty string
fn column(line: &str, range: std::ops::Range<usize>) -> &str {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end).unwrap_or_default().trim()
}

fn parse_atom(line: &str) -> anyhow::Result<AtomRecord> {
    if line.len() < 54 {
        anyhow::bail!("atom record too short ({} columns)", line.len());
    }
    let coordinate = |range: std::ops::Range<usize>, axis: &str| -> anyhow::Result<f64> {
        let text = column(line, range);
        text.parse::<f64>()
            .map_err(|_| anyhow::anyhow!("invalid {} coordinate '{}'", axis, text))
    };
    let position = Point::new(
        coordinate(30..38, "x")?,
        coordinate(38..46, "y")?,
        coordinate(46..54, "z")?,
    );
    let name = column(line, 12..16).to_string();
    let element = match column(line, 76..78) {
        "" => element_from_name(&name),
        symbol => symbol.to_string(),
    };
    Ok(AtomRecord {
        serial: column(line, 6..11).parse().unwrap_or_default(),
        residue_name: column(line, 17..20).to_string(),
        chain_id: column(line, 21..22).to_string(),
        residue_seq: column(line, 22..26).parse().unwrap_or_default(),
        color: element_color(&element),
        element,
        name,
        position,
    })
}

/// First alphabetic character of the atom name
fn element_from_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_string())
        .unwrap_or_default()
}

/// CPK-like color table; unknown elements are grey-pink
fn element_color(element: &str) -> [f32; 3] {
    match element.to_uppercase().as_str() {
        "H" => [1.0, 1.0, 1.0],
        "C" => [0.565, 0.565, 0.565],
        "N" => [0.188, 0.314, 0.973],
        "O" => [1.0, 0.051, 0.051],
        "P" => [1.0, 0.502, 0.0],
        "S" => [1.0, 1.0, 0.188],
        "FE" => [0.878, 0.4, 0.2],
        "MG" => [0.541, 1.0, 0.0],
        "NA" => [0.671, 0.361, 0.949],
        "CL" => [0.122, 0.941, 0.122],
        "ZN" => [0.49, 0.502, 0.69],
        _ => [1.0, 0.784, 0.784],
    }
}
