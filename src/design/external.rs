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

//! External file table

use derive_getters::Getters;

/// Role of an external file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Atomic structure (`.pdb`)
    Molecule,
    /// oxDNA configuration (`.oxdna`)
    Trajectory,
}

impl FileFormat {
    /// Guess the format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdb" => Some(Self::Molecule),
            "oxdna" => Some(Self::Trajectory),
            _ => None,
        }
    }
}

/// Auxiliary file referenced by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ExternalFileRecord {
    id: i64,
    /// Relative path as written by the authoring tool
    path: String,
    /// Declared content hash (lowercase hex MD5), possibly empty
    hash: String,
    /// Content is embedded in the container
    is_included: bool,
}

impl ExternalFileRecord {
    pub fn new(id: i64, path: impl Into<String>, hash: impl Into<String>, is_included: bool) -> Self {
        Self {
            id,
            path: path.into(),
            hash: hash.into(),
            is_included,
        }
    }

    /// Last path component; both `/` and `\` separate components
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }

    /// Extension of the file name, without the dot
    pub fn extension(&self) -> &str {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, extension)| extension)
            .unwrap_or_default()
    }

    pub fn format(&self) -> Option<FileFormat> {
        FileFormat::from_extension(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_formats() {
        let record = ExternalFileRecord::new(1, "designs/parts/1BNA.PDB", "", false);
        assert_eq!(record.file_name(), "1BNA.PDB");
        assert_eq!(record.extension(), "PDB");
        assert_eq!(record.format(), Some(FileFormat::Molecule));

        let record = ExternalFileRecord::new(2, r"C:\sim\last_conf.oxdna", "", true);
        assert_eq!(record.file_name(), "last_conf.oxdna");
        assert_eq!(record.format(), Some(FileFormat::Trajectory));

        let record = ExternalFileRecord::new(3, "notes.txt", "", false);
        assert_eq!(record.format(), None);

        let record = ExternalFileRecord::new(4, "README", "", false);
        assert_eq!(record.extension(), "");
        assert_eq!(record.format(), None);
    }
}
