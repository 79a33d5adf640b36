//! Magnetometer input: raw counts, the sensor-to-camera reference transform,
//! and the seam for an external geomagnetic field model.

use crate::linalg::multiply3x3_3x1;
use crate::{linalg, Matrix3, Quaternion, Vector3};

/// One three-axis magnetometer sample in the magnetometer's own frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MagnetometerReading {
    /// Signed counts per axis (x, y, z).
    pub raw: [i16; 3],
}

impl MagnetometerReading {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { raw: [x, y, z] }
    }

    pub fn as_vector(&self) -> Vector3 {
        Vector3::new(self.raw[0] as f32, self.raw[1] as f32, self.raw[2] as f32)
    }

    /// Quantise a field vector (already in counts) to a reading, saturating
    /// each axis to the `i16` range.
    pub fn from_counts(field: &Vector3) -> Self {
        let q = |v: f32| v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        Self::new(q(field.x), q(field.y), q(field.z))
    }
}

/// Magnetometer-to-camera reference frame transform.
///
/// Stored as the 16-element row-major 4×4 affine matrix the spacecraft bus
/// supplies; only the upper-left 3×3 rotation block is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetometerTransform {
    pub matrix: [f32; 16],
}

impl MagnetometerTransform {
    pub fn identity() -> Self {
        Self::from_rotation(&Matrix3::identity())
    }

    /// Affine matrix with the given rotation block and no translation.
    pub fn from_rotation(rotation: &Matrix3) -> Self {
        let mut matrix = [0.0; 16];
        for row in 0..3 {
            for col in 0..3 {
                matrix[row * 4 + col] = rotation[(row, col)];
            }
        }
        matrix[15] = 1.0;
        Self { matrix }
    }

    /// Affine matrix rotating magnetometer-frame vectors by `q`.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        Self::from_rotation(&linalg::quat_to_matrix(q))
    }

    /// The 3×3 rotation block.
    pub fn rotation(&self) -> Matrix3 {
        Matrix3::from_fn(|row, col| self.matrix[row * 4 + col])
    }

    /// Field in the camera frame, in raw counts.
    pub fn to_camera_frame(&self, reading: &MagnetometerReading) -> Vector3 {
        multiply3x3_3x1(&self.rotation(), &reading.as_vector())
    }

    /// Inverse of [`to_camera_frame`](Self::to_camera_frame) for an
    /// orthonormal rotation block, quantised to a reading.
    pub fn to_sensor_frame(&self, field: &Vector3) -> MagnetometerReading {
        MagnetometerReading::from_counts(&multiply3x3_3x1(&self.rotation().transpose(), field))
    }
}

impl Default for MagnetometerTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 16]> for MagnetometerTransform {
    fn from(matrix: [f32; 16]) -> Self {
        Self { matrix }
    }
}

/// Reference geomagnetic field model, e.g. an IGRF evaluation.
///
/// Not used by the per-cycle estimate; a caller can feed its output through
/// [`MagnetometerTransform::to_sensor_frame`] to simulate a reading.
pub trait GeomagneticModel {
    /// Field vector at a geodetic position, in the model's local frame.
    fn field(&self, latitude_deg: f32, longitude_deg: f32, altitude_km: f32) -> Vector3;
}
