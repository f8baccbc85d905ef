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

//! # Splitting of UNF containers
//!
//! A container is UTF-8 text where the JSON manifest comes first, followed by
//! any number of embedded files of the form
//!
//! ~~~text
//! #INCLUDED_FILE <name>
//! <raw content>
//! ~~~

use crate::Error;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Marker preceding each embedded file
pub const MARKER: &str = "#INCLUDED_FILE";

/// Manifest used when a container cannot be split
pub const EMPTY_MANIFEST: &str = "{}";

fn marker_regex() -> &'static Regex {
    static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    MARKER_REGEX.get_or_init(|| Regex::new(r"#INCLUDED_FILE\s+").expect("valid marker regex"))
}

/// Manifest text and embedded files of a container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    manifest: String,
    files: HashMap<String, String>,
}

impl Container {
    /// Split a container into the manifest and the embedded files.
    ///
    /// Fails with [`Error::MalformedContainer`] if no marker is present.
    ///
    /// # Examples
    /// ~~~
    /// use unf::Container;
    /// let text = "{\"name\": \"x\"}\n#INCLUDED_FILE a.pdb\nATOM\nEND\n";
    /// let container = Container::split(text).unwrap();
    /// assert_eq!(container.manifest(), "{\"name\": \"x\"}\n");
    /// assert_eq!(container.file("a.pdb"), Some("ATOM\nEND\n"));
    /// assert!(Container::split("{}").is_err());
    /// ~~~
    pub fn split(text: &str) -> Result<Self, Error> {
        let mut parts = marker_regex().split(text);
        let manifest = parts.next().unwrap_or_default();
        let mut files = HashMap::new();
        let mut found = false;
        for block in parts {
            found = true;
            // A trailing block without a line break is a name with empty content,
            // so a truncated container still resolves the record by its path.
            let (name, content) = match block.find('\n') {
                Some(index) => (&block[..index], &block[index + 1..]),
                None => (block, ""),
            };
            let name = name.trim();
            if files.insert(name.to_string(), content.to_string()).is_some() {
                log::warn!("Embedded file '{}' appears more than once; keeping the last", name);
            }
        }
        if !found {
            return Err(Error::MalformedContainer);
        }
        log::debug!("Container holds {} embedded file(s)", files.len());
        Ok(Self {
            manifest: manifest.to_string(),
            files,
        })
    }

    /// Split a container, falling back to an empty manifest when no marker is found.
    ///
    /// The second element is `true` when the fallback was used; the caller decides
    /// how to surface it.
    pub fn split_or_empty(text: &str) -> (Self, bool) {
        match Self::split(text) {
            Ok(container) => (container, false),
            Err(_) => (Self::from_manifest(EMPTY_MANIFEST), true),
        }
    }

    /// Container with a manifest and no embedded files
    pub fn from_manifest(manifest: &str) -> Self {
        Self {
            manifest: manifest.to_string(),
            files: HashMap::new(),
        }
    }

    /// JSON manifest text
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Content of an embedded file
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// All embedded files, keyed by name
    pub fn files(&self) -> &HashMap<String, String> {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_multiple_files() {
        let text = "{\"a\": 1}\n#INCLUDED_FILE  dir/one.pdb \nline1\r\nline2\n#INCLUDED_FILE two.oxdna\nt 0\n";
        let container = Container::split(text).unwrap();
        assert_eq!(container.manifest(), "{\"a\": 1}\n");
        assert_eq!(container.files().len(), 2);
        assert_eq!(container.file("dir/one.pdb"), Some("line1\r\nline2\n"));
        assert_eq!(container.file("two.oxdna"), Some("t 0\n"));
    }

    #[test]
    fn content_kept_verbatim() {
        let text = "{}#INCLUDED_FILE x.pdb\n\n  indented\n\n";
        let container = Container::split(text).unwrap();
        assert_eq!(container.manifest(), "{}");
        assert_eq!(container.file("x.pdb"), Some("\n  indented\n\n"));
    }

    #[test]
    fn name_without_content() {
        let container = Container::split("{}\n#INCLUDED_FILE lonely.pdb").unwrap();
        assert_eq!(container.file("lonely.pdb"), Some(""));
    }

    #[test]
    fn missing_marker() {
        assert!(matches!(
            Container::split("{\"name\": \"plain\"}"),
            Err(Error::MalformedContainer)
        ));
        let (container, malformed) = Container::split_or_empty("{\"name\": \"plain\"}");
        assert!(malformed);
        assert_eq!(container.manifest(), EMPTY_MANIFEST);
        assert!(container.files().is_empty());
    }
}
