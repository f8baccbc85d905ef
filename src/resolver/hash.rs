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

//! Platform-independent content hashing

use md5::{Digest, Md5};

/// Lowercase hex MD5 of the content with every `\r` and `\n` removed
///
/// # Examples
/// ~~~
/// use unf::resolver::content_hash;
/// assert_eq!(content_hash("ABC\r\nDEF"), content_hash("ABC\nDEF"));
/// assert_eq!(content_hash("a\nb\rc"), "900150983cd24fb0d6963f7d28e17f72");
/// ~~~
pub fn content_hash(content: &str) -> String {
    let mut hasher = Md5::new();
    for line in content.split(['\r', '\n']) {
        hasher.update(line.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Compare a computed hash with a declared one, ignoring case and surrounding space
pub fn hashes_match(declared: &str, computed: &str) -> bool {
    declared.trim().eq_ignore_ascii_case(computed)
}
