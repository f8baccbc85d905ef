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

//! # Length and angle units
//!
//! The native length unit is the ångström and angles are handled in radians internally.
//! Unknown or absent unit tags are treated as native (identity conversion) so that
//! older files without explicit units are still accepted.

use crate::{Point, UnitQuaternion};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Length unit declared by a design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    Picometer,
    Nanometer,
    /// Native unit
    #[default]
    Angstrom,
}

impl LengthUnit {
    /// Parse a unit tag (`pm`, `nm`, `A`). Anything else is native.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("pm") => Self::Picometer,
            Some("nm") => Self::Nanometer,
            _ => Self::Angstrom,
        }
    }

    /// Number of ångströms per unit
    pub const fn angstroms(&self) -> f64 {
        match self {
            Self::Picometer => 0.01,
            Self::Nanometer => 10.0,
            Self::Angstrom => 1.0,
        }
    }
}

/// Angle unit declared by a design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Degree,
    Radian,
}

impl AngleUnit {
    /// Parse a unit tag (`deg`, `rad`). Anything else is degrees.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("rad") => Self::Radian,
            _ => Self::Degree,
        }
    }
}

/// Units declared by one design
///
/// This is an immutable value passed explicitly to every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitSystem {
    pub length: LengthUnit,
    pub angle: AngleUnit,
}

impl UnitSystem {
    pub const fn new(length: LengthUnit, angle: AngleUnit) -> Self {
        Self { length, angle }
    }

    /// Units from the manifest tags `lengthUnits` and `angularUnits`
    pub fn from_tags(length: Option<&str>, angle: Option<&str>) -> Self {
        Self::new(LengthUnit::from_tag(length), AngleUnit::from_tag(angle))
    }

    /// Convert a length to ångström
    pub fn length(&self, value: f64) -> f64 {
        value * self.length.angstroms()
    }

    /// Convert a position vector to ångström
    pub fn vector(&self, value: &Point) -> Point {
        value * self.length.angstroms()
    }

    /// Convert a loosely typed coordinate list to an ångström vector.
    ///
    /// Returns `None` if fewer than three values are given.
    pub fn vector_from_slice(&self, values: &[f64]) -> Option<Point> {
        match values {
            [x, y, z, ..] => Some(self.vector(&Vector3::new(*x, *y, *z))),
            _ => None,
        }
    }

    /// Convert an angle to radians
    pub fn radians(&self, value: f64) -> f64 {
        match self.angle {
            AngleUnit::Degree => value.to_radians(),
            AngleUnit::Radian => value,
        }
    }

    /// Convert an angle to degrees
    pub fn degrees(&self, value: f64) -> f64 {
        match self.angle {
            AngleUnit::Degree => value,
            AngleUnit::Radian => value.to_degrees(),
        }
    }

    /// Orientation from three Euler angles in the declared angle unit.
    ///
    /// Returns `None` if fewer than three angles are given.
    pub fn orientation_from_slice(&self, values: &[f64]) -> Option<UnitQuaternion> {
        match values {
            [x, y, z, ..] => Some(euler_xyz(
                self.radians(*x),
                self.radians(*y),
                self.radians(*z),
            )),
            _ => None,
        }
    }
}

/// Rotation from Euler angles (radians) applied in intrinsic X, Y, Z order,
/// i.e. `R = Rx · Ry · Rz`.
pub fn euler_xyz(x: f64, y: f64, z: f64) -> UnitQuaternion {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z)
}
