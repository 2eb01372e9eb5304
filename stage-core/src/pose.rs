//! Poses - translate/rotate/scale transforms relative to an element's centre.

use serde::{Deserialize, Serialize};

/// A three-axis numeric triple used for translation and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components one.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a new triple.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise negation.
    #[must_use]
    pub fn negated(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    /// Component-wise reciprocal. A zero component yields infinity.
    #[must_use]
    pub fn reciprocal(self) -> Self {
        Self::new(1.0 / self.x, 1.0 / self.y, 1.0 / self.z)
    }
}

/// Rotation in degrees about each axis.
///
/// `revert` marks a rotation that undoes another one: it is composed in
/// Z, Y, X order instead of X, Y, Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Pitch.
    pub x: f64,
    /// Yaw.
    pub y: f64,
    /// Roll.
    pub z: f64,
    /// Compose in reverse axis order.
    #[serde(default)]
    pub revert: bool,
}

impl Rotation {
    /// Create a forward rotation.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            revert: false,
        }
    }

    /// Negate every axis. The result is a forward rotation.
    #[must_use]
    pub fn negated(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    /// The same angles flagged for reverse composition.
    #[must_use]
    pub fn reverted(self) -> Self {
        Self {
            revert: true,
            ..self
        }
    }
}

/// Combined translate/rotate/scale transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in pixels.
    pub translate: Vec3,
    /// Rotation in degrees.
    pub rotate: Rotation,
    /// Scale factor per axis.
    pub scale: Vec3,
}

impl Pose {
    /// The identity pose: no translation, no rotation, unit scale.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translate: Vec3::ZERO,
            rotate: Rotation::new(0.0, 0.0, 0.0),
            scale: Vec3::ONE,
        }
    }

    /// The camera pose that brings this pose's origin to the viewport centre.
    ///
    /// Translation and rotation are negated, scale is inverted per axis.
    /// The returned rotation is not yet flagged for reverse composition.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            translate: self.translate.negated(),
            rotate: self.rotate.negated(),
            scale: self.scale.reciprocal(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Format a number for CSS, normalizing negative zero.
pub(crate) fn css_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_negates_and_inverts() {
        let pose = Pose {
            translate: Vec3::new(100.0, -50.0, 20.0),
            rotate: Rotation::new(10.0, 20.0, 30.0),
            scale: Vec3::new(2.0, 4.0, 1.0),
        };
        let inverse = pose.inverse();

        assert_eq!(inverse.translate, Vec3::new(-100.0, 50.0, -20.0));
        assert_eq!(inverse.rotate, Rotation::new(-10.0, -20.0, -30.0));
        assert!(!inverse.rotate.revert);
        assert!((inverse.scale.x - 0.5).abs() < f64::EPSILON);
        assert!((inverse.scale.y - 0.25).abs() < f64::EPSILON);
        assert!((inverse.scale.z - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverse_of_identity_is_identity() {
        let inverse = Pose::identity().inverse();
        assert_eq!(inverse.scale, Vec3::ONE);
        assert_eq!(css_number(inverse.translate.x), "0");
        assert_eq!(css_number(inverse.rotate.z), "0");
    }

    #[test]
    fn test_zero_scale_inverts_to_infinity() {
        let pose = Pose {
            scale: Vec3::new(0.0, 1.0, 1.0),
            ..Pose::identity()
        };
        assert!(pose.inverse().scale.x.is_infinite());
    }

    #[test]
    fn test_reverted_keeps_angles() {
        let rotation = Rotation::new(1.0, 2.0, 3.0).reverted();
        assert!(rotation.revert);
        assert!((rotation.z - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_css_number_formats() {
        assert_eq!(css_number(1.0), "1");
        assert_eq!(css_number(0.5), "0.5");
        assert_eq!(css_number(-0.0), "0");
        assert_eq!(css_number(-30.0), "-30");
    }
}
