// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linear volume scaling between the host's `0..1` range and device units.

use crate::error::{ConfigError, ValueError};

/// Device volume bounds used to scale host volume fractions.
///
/// The host always speaks in fractions between 0.0 and 1.0. Devices usually
/// speak in their own units (0-100 by default), so every volume command is
/// scaled into `[min, max]` before it is published and every received value
/// is scaled back.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::types::VolumeRange;
///
/// let range = VolumeRange::new(0.0, 100.0).unwrap();
/// assert_eq!(range.to_device(0.25), 25.0);
/// assert_eq!(range.to_fraction(25.0), 0.25);
///
/// // Equal bounds cannot be scaled
/// assert!(VolumeRange::new(10.0, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRange {
    min: f64,
    max: f64,
}

impl VolumeRange {
    /// Default lower bound.
    pub const DEFAULT_MIN: f64 = 0.0;

    /// Default upper bound.
    pub const DEFAULT_MAX: f64 = 100.0;

    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DegenerateVolumeRange` if `min == max`.
    #[allow(clippy::float_cmp)]
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if min == max {
            return Err(ConfigError::DegenerateVolumeRange(min));
        }
        Ok(Self { min, max })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Scales a host fraction to device units: `min + fraction * (max - min)`.
    #[must_use]
    pub fn to_device(&self, fraction: f64) -> f64 {
        self.min + fraction * (self.max - self.min)
    }

    /// Scales a device value to a host fraction: `(raw - min) / (max - min)`.
    #[must_use]
    pub fn to_fraction(&self, raw: f64) -> f64 {
        (raw - self.min) / (self.max - self.min)
    }

    /// Checks that a host fraction lies within `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::VolumeOutOfRange` otherwise (NaN included).
    pub fn check_fraction(fraction: f64) -> Result<f64, ValueError> {
        if (0.0..=1.0).contains(&fraction) {
            Ok(fraction)
        } else {
            Err(ValueError::VolumeOutOfRange(fraction))
        }
    }
}

impl Default for VolumeRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_round_trip() {
        let range = VolumeRange::new(-80.0, 20.0).unwrap();
        for v in [0.0, 0.1, 0.5, 0.73, 1.0] {
            let wire = range.to_device(v);
            assert!((range.to_fraction(wire) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn inverted_range_still_scales() {
        let range = VolumeRange::new(100.0, 0.0).unwrap();
        assert!((range.to_device(0.25) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn check_fraction_bounds() {
        assert!(VolumeRange::check_fraction(0.0).is_ok());
        assert!(VolumeRange::check_fraction(1.0).is_ok());
        assert!(VolumeRange::check_fraction(1.5).is_err());
        assert!(VolumeRange::check_fraction(f64::NAN).is_err());
    }

    #[test]
    fn default_bounds() {
        let range = VolumeRange::default();
        assert!((range.min() - 0.0).abs() < f64::EPSILON);
        assert!((range.max() - 100.0).abs() < f64::EPSILON);
    }
}
