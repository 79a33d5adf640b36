//! Horizon sensor optics: focal length, optical centre and lens distortion.
//!
//! `CameraModel` maps between image-centred pixel coordinates (origin at the
//! image centre, +x right, +y up, as produced by edge extraction) and
//! angles off the boresight.
//!
//! # Pipeline
//!
//! ```text
//! pixel → subtract crpix → radial correction → ideal pixel → atan(r / f) → off-axis angle
//! ```

use rkyv::{Archive, Deserialize, Serialize};

use crate::distortion::Distortion;
use crate::pixel_grid::COLS;
use crate::Vector2;

/// Horizontal field of view of the IR sensor, 57°.
pub const SENSOR_FOV_RAD: f32 = 0.994_838;

/// Camera intrinsics.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
pub struct CameraModel {
    /// Focal length in pixels: `f = (width/2) / tan(fov/2)`.
    pub focal_length_px: f32,
    /// Optical centre offset from the geometric image centre, pixels `[x, y]`.
    pub crpix: [f32; 2],
    /// Lens distortion, applied after crpix subtraction.
    pub distortion: Distortion,
}

impl CameraModel {
    /// Create a camera model from a horizontal field of view and image width.
    ///
    /// Sets crpix to `[0, 0]` and no distortion.
    pub fn from_fov(fov_rad: f32, image_width: u32) -> Self {
        let f = (image_width as f32 / 2.0) / (fov_rad / 2.0).tan();
        Self {
            focal_length_px: f,
            crpix: [0.0, 0.0],
            distortion: Distortion::None,
        }
    }

    /// `true` when [`to_ideal`](Self::to_ideal) is the identity.
    pub fn is_ideal(&self) -> bool {
        self.crpix == [0.0, 0.0] && self.distortion.is_none()
    }

    /// Observed image-centred pixel → ideal pinhole pixel about the optical
    /// centre.
    pub fn to_ideal(&self, p: &Vector2) -> Vector2 {
        let offset = Vector2::new(p.x - self.crpix[0], p.y - self.crpix[1]);
        self.distortion.correct(&offset)
    }

    /// Correct a list of edge points in place. A no-op for an ideal camera.
    pub fn correct_points(&self, points: &mut [Vector2]) {
        if self.is_ideal() {
            return;
        }
        for p in points.iter_mut() {
            *p = self.to_ideal(p);
        }
    }

    /// Angle off the boresight of a point `offset_px` ideal pixels from the
    /// optical centre. Negative offsets give negative angles.
    pub fn off_axis_angle(&self, offset_px: f32) -> f32 {
        (offset_px / self.focal_length_px).atan()
    }
}

impl Default for CameraModel {
    fn default() -> Self {
        Self::from_fov(SENSOR_FOV_RAD, COLS as u32)
    }
}
