// SPDX-License-Identifier: MIT OR Apache-2.0
//! Primitive value parsing and numeric formatting for track logs.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delimiter between quaternion components
pub const COMPONENT_DELIMITER: char = ',';

/// Rotation stored as `x, y, z, w`, exactly as recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W (scalar) component
    pub w: f32,
}

impl Quaternion {
    /// The identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a quaternion from its components
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Components as an `[x, y, z, w]` array
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Four-dimensional dot product
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Angle in radians between two unit rotations
    pub fn angle_to(self, other: Self) -> f32 {
        2.0 * self.dot(other).abs().min(1.0).acos()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Parse a float, independent of locale
pub fn parse_float(text: &str) -> Result<f32> {
    text.trim()
        .parse::<f32>()
        .map_err(|_| ReplayError::primitive("float", text))
}

/// Parse a timestamp; unlike [`parse_float`] this rejects NaN and infinities
pub fn parse_timestamp(text: &str) -> Result<f32> {
    let value = parse_float(text).map_err(|_| ReplayError::primitive("timestamp", text))?;
    if !value.is_finite() {
        return Err(ReplayError::primitive("timestamp", text));
    }
    Ok(value)
}

/// Parse a signed index (bone parent, sub-asset or joint index)
pub fn parse_int(text: &str) -> Result<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| ReplayError::primitive("integer", text))
}

/// Parse `x,y,z,w` into a quaternion. No normalization is applied.
pub fn parse_quaternion(text: &str) -> Result<Quaternion> {
    let mut components = [0.0f32; 4];
    let mut count = 0;

    for part in text.split(COMPONENT_DELIMITER) {
        if count == components.len() {
            return Err(ReplayError::primitive("quaternion", text));
        }
        components[count] =
            parse_float(part).map_err(|_| ReplayError::primitive("quaternion", text))?;
        count += 1;
    }

    if count != components.len() {
        return Err(ReplayError::primitive("quaternion", text));
    }

    Ok(Quaternion::from(components))
}

/// How floats are written when encoding a track
///
/// The string form follows the recorder's format strings: `F<n>` for a fixed
/// number of decimals, `0.000` style patterns, and `R`/`G` for the shortest
/// text that reads back to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NumericFormat {
    /// Fixed number of decimal places
    Fixed(u8),
    /// Shortest round-trip representation
    Shortest,
}

impl NumericFormat {
    /// Format a single value
    pub fn format(self, value: f32) -> String {
        match self {
            Self::Fixed(precision) => format!("{:.*}", precision as usize, value),
            Self::Shortest => format!("{value}"),
        }
    }

    /// Largest difference a value can pick up from one encode/decode pass
    pub fn tolerance(self) -> f32 {
        match self {
            Self::Fixed(precision) => 0.5 * 10f32.powi(-i32::from(precision)),
            Self::Shortest => 0.0,
        }
    }
}

impl Default for NumericFormat {
    fn default() -> Self {
        Self::Fixed(4)
    }
}

impl fmt::Display for NumericFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(precision) => write!(f, "F{precision}"),
            Self::Shortest => f.write_str("R"),
        }
    }
}

impl FromStr for NumericFormat {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || ReplayError::InvalidFormat(s.to_string());

        match s {
            "R" | "r" | "G" | "g" => return Ok(Self::Shortest),
            "F" | "f" => return Ok(Self::Fixed(2)),
            _ => {}
        }

        if let Some(digits) = s.strip_prefix(['F', 'f']) {
            return digits.parse::<u8>().map(Self::Fixed).map_err(|_| invalid());
        }

        // Custom pattern such as "0.000"
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        let is_pattern = !whole.is_empty()
            && whole.chars().all(|c| c == '0' || c == '#')
            && fraction.chars().all(|c| c == '0' || c == '#');
        if !is_pattern {
            return Err(invalid());
        }
        u8::try_from(fraction.len()).map(Self::Fixed).map_err(|_| invalid())
    }
}

impl TryFrom<String> for NumericFormat {
    type Error = ReplayError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<NumericFormat> for String {
    fn from(value: NumericFormat) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quaternion() {
        let q = parse_quaternion("0.1,0.2,0.3,0.9").unwrap();
        assert_eq!(q, Quaternion::new(0.1, 0.2, 0.3, 0.9));
    }

    #[test]
    fn test_parse_quaternion_keeps_unnormalized_values() {
        let q = parse_quaternion("2,0,0,0").unwrap();
        assert_eq!(q.x, 2.0);
    }

    #[test]
    fn test_parse_quaternion_wrong_arity() {
        assert!(matches!(
            parse_quaternion("0.1,0.2,0.3"),
            Err(ReplayError::MalformedPrimitive { .. })
        ));
        assert!(matches!(
            parse_quaternion("0.1,0.2,0.3,0.4,0.5"),
            Err(ReplayError::MalformedPrimitive { .. })
        ));
        assert!(parse_quaternion("0.1,x,0.3,0.4").is_err());
    }

    #[test]
    fn test_parse_timestamp_rejects_non_finite() {
        assert_eq!(parse_timestamp(" 1.5 ").unwrap(), 1.5);
        assert!(parse_timestamp("NaN").is_err());
        assert!(parse_timestamp("inf").is_err());
        assert!(parse_float("1,5").is_err());
    }

    #[test]
    fn test_numeric_format_strings() {
        assert_eq!("F3".parse::<NumericFormat>().unwrap(), NumericFormat::Fixed(3));
        assert_eq!("0.00".parse::<NumericFormat>().unwrap(), NumericFormat::Fixed(2));
        assert_eq!("0".parse::<NumericFormat>().unwrap(), NumericFormat::Fixed(0));
        assert_eq!("R".parse::<NumericFormat>().unwrap(), NumericFormat::Shortest);
        assert!("X2".parse::<NumericFormat>().is_err());
        assert!("".parse::<NumericFormat>().is_err());
    }

    #[test]
    fn test_numeric_format_output() {
        assert_eq!(NumericFormat::Fixed(3).format(1.0), "1.000");
        assert_eq!(NumericFormat::Fixed(1).format(-0.26), "-0.3");
        assert_eq!(NumericFormat::Shortest.format(0.1), "0.1");
        assert_eq!(NumericFormat::Fixed(2).to_string(), "F2");
    }

    #[test]
    fn test_angle_between_rotations() {
        let q = Quaternion::IDENTITY;
        assert!(q.angle_to(q) < 1e-6);
        let half_turn = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        assert!((q.angle_to(half_turn) - std::f32::consts::PI).abs() < 1e-5);
    }
}
