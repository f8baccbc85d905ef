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

//! Options controlling the resolution pipeline.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// Format version understood by this crate
pub const SUPPORTED_FORMAT_VERSION: &str = "1.0.0";

/// Number of ångströms per rendering unit
pub const ANGSTROMS_PER_UNIT: f64 = 256.0;

/// Base address of the public structure repository used for remote molecule files
pub const PROTEIN_DATA_BANK_URL: &str = "http://files.rcsb.org/download/";

/// Length of one oxDNA simulation unit in ångström
pub const OXDNA_LENGTH_UNIT: f64 = 8.518;

/// Resolution options
///
/// # Examples
/// ~~~
/// use unf::ResolveOptions;
/// let options = ResolveOptions::from_yaml("angstroms_per_unit: 1.0").unwrap();
/// assert_eq!(options.angstroms_per_unit, 1.0);
/// assert_eq!(options.supported_version, "1.0.0");
/// assert!(ResolveOptions::from_yaml("angstroms_per_unit: 0.0").is_err());
/// ~~~
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, Builder)]
#[serde(default, deny_unknown_fields)]
#[builder(default)]
pub struct ResolveOptions {
    /// Ångströms per rendering unit; all output positions are divided by this
    #[validate(custom(function = "validate_positive"))]
    pub angstroms_per_unit: f64,
    /// Format version accepted without warning
    #[builder(setter(into))]
    pub supported_version: String,
    /// Base address for remote molecule files; the file name is appended
    #[builder(setter(into))]
    pub remote_base_url: String,
    /// Compare content hashes of loaded files against the manifest
    pub verify_hashes: bool,
    /// Ångströms per oxDNA length unit
    #[validate(custom(function = "validate_positive"))]
    pub oxdna_length_unit: f64,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            angstroms_per_unit: ANGSTROMS_PER_UNIT,
            supported_version: SUPPORTED_FORMAT_VERSION.to_string(),
            remote_base_url: PROTEIN_DATA_BANK_URL.to_string(),
            verify_hashes: true,
            oxdna_length_unit: OXDNA_LENGTH_UNIT,
        }
    }
}

impl ResolveOptions {
    /// Parse and validate options from a YAML string
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse and validate options from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Cannot open '{}': {}", path.as_ref().display(), e)
        })?;
        let options: Self = serde_yaml::from_reader(file)?;
        options.validate()?;
        Ok(options)
    }

    /// Address of a remote molecule file
    pub fn remote_url(&self, file_name: &str) -> String {
        format!("{}{}", self.remote_base_url, file_name)
    }
}

fn validate_positive(value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("must be positive"))
    }
}
