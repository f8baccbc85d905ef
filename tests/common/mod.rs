//! Shared utilities for integration tests.

use std::path::{Path, PathBuf};

/// Install a logger once; controlled by `RUST_LOG`
#[allow(dead_code)]
pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

/// Path to a file in `tests/files`
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("files")
        .join(name)
}

/// A well-formed PDB `ATOM` record
#[allow(dead_code)]
pub fn atom_line(serial: i64, name: &str, chain: char, residue_seq: i64, position: [f64; 3]) -> String {
    format!(
        "ATOM  {:>5} {:<4} GLY {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
        serial, name, chain, residue_seq, position[0], position[1], position[2]
    )
}
