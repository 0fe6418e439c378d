//! Coordinate transform between the RTLS frame and the platform frame

use nalgebra::Vector2;

/// A 2D pose in the platform frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

/// Static translation between the SICK Tag-LOC frame and the platform frame.
///
/// The offsets come from configuration and are computed offline from ground
/// truth point pairs. The RTLS y axis is reversed with respect to the
/// platform, so the y coordinate is negated before the offset is removed.
/// The RTLS reports no orientation, so yaw is always zero.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransform {
    translation: Vector2<f64>,
}

impl FrameTransform {
    /// Create a transform from the configured translation offsets
    pub fn new(translation_x: f64, translation_y: f64) -> Self {
        FrameTransform {
            translation: Vector2::new(translation_x, translation_y),
        }
    }

    /// Map an RTLS position into the platform frame
    pub fn apply(&self, x: f64, y: f64) -> Pose {
        let mapped = Vector2::new(x, -y) - self.translation;
        Pose {
            x: mapped.x,
            y: mapped.y,
            yaw: 0.0,
        }
    }
}
