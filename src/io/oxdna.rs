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

//! oxDNA configuration reader.
//!
//! After three header lines (time, box, energy) each row holds 15 numbers:
//! position, backbone versor, normal versor, velocity and angular velocity.

use super::{ParticleRecord, TrajectoryReader};
use crate::Point;
use regex::Regex;
use std::sync::OnceLock;

const HEADER_LINES: usize = 3;
const FIELDS_PER_ROW: usize = 15;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[ ,]+").expect("valid separator regex"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OxDnaReader;

impl TrajectoryReader for OxDnaReader {
    fn read_trajectory(&self, content: &str) -> anyhow::Result<Vec<ParticleRecord>> {
        let particles: Vec<_> = content
            .lines()
            .skip(HEADER_LINES)
            .filter_map(|line| {
                let particle = parse_row(line.trim());
                if particle.is_none() {
                    log::warn!("Ignored oxDNA configuration row '{}'", line);
                }
                particle
            })
            .collect();
        log::debug!("Read {} oxDNA particle(s)", particles.len());
        Ok(particles)
    }
}

/// Particle from the first 15 fields of a row; further fields are ignored
fn parse_row(line: &str) -> Option<ParticleRecord> {
    let fields: Vec<&str> = separator().split(line).collect();
    if fields.len() < FIELDS_PER_ROW {
        return None;
    }
    let values = fields[..FIELDS_PER_ROW]
        .iter()
        .map(|field| field.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let vector = |i: usize| Point::new(values[i], values[i + 1], values[i + 2]);
    Some(ParticleRecord {
        position: vector(0),
        backbone: vector(3),
        normal: vector(6),
        velocity: vector(9),
        angular_velocity: vector(12),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_configuration() {
        let content = "t = 0\r\nb = 20 20 20\r\nE = 0 0 0\r\n\
            1 2 3 1 0 0 0 0 1 0 0 0 0 0 0\r\n\
            4,5,6, 0,1,0, 0,0,-1, 0.1,0,0, 0,0,0.2\r\n\
            \r\n\
            1 2 3\r\n";
        let particles = OxDnaReader.read_trajectory(content).unwrap();
        assert_eq!(particles.len(), 2);
        assert_eq!(particles[0].position, Point::new(1.0, 2.0, 3.0));
        assert_eq!(particles[0].normal, Point::z());
        assert_eq!(particles[1].backbone, Point::y());
        assert_eq!(particles[1].velocity, Point::new(0.1, 0.0, 0.0));
        assert_eq!(particles[1].angular_velocity, Point::new(0.0, 0.0, 0.2));
    }

    #[test]
    fn header_only() {
        assert!(OxDnaReader
            .read_trajectory("t = 0\nb = 1 1 1\nE = 0 0 0\n")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let content = "t = 0\nb = 1 1 1\nE = 0 0 0\n\
            1,2,3,1,0,0,0,0,1,0,0,0,0,0,0,\n\
            4 5 6 0 1 0 0 0 1 0 0 0 0 0 0 7 8\n";
        let particles = OxDnaReader.read_trajectory(content).unwrap();
        assert_eq!(particles.len(), 2);
        assert_eq!(particles[0].position, Point::new(1.0, 2.0, 3.0));
        assert_eq!(particles[1].position, Point::new(4.0, 5.0, 6.0));
        assert_eq!(particles[1].angular_velocity, Point::zeros());
    }
}
