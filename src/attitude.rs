//! Attitude from the fitted horizon circle and the magnetic field.
//!
//! # Frames
//!
//! The camera frame has +x right and +y up in the image, and the boresight
//! along -z. The orientation quaternion rotates the local level frame
//! (z toward zenith, y toward magnetic north in the horizontal plane) into
//! the camera frame, so rotating the boresight `(0, 0, -1)` by it gives the
//! nadir direction seen from the camera.
//!
//! # Derivation
//!
//! 1. **Roll** is the signed angle between the image-centre-from-circle-centre
//!    direction and the image vertical, a rotation about z.
//! 2. **Pitch** is the angle between boresight and nadir: the angular offset
//!    of the horizon vertex from the image centre plus the Earth's angular
//!    radius at the current altitude, a rotation about x.
//! 3. **Yaw** comes from the magnetic field projected onto the horizontal
//!    plane, brought back through the roll/pitch rotation, a rotation about z.
//!
//! Both roll and pitch are applied in the negative sense, and the three
//! rotations are composed as `(roll * pitch) * yaw`. That order is fixed.

use std::fmt;

use tracing::debug;

use crate::camera_model::CameraModel;
use crate::circle_fit::Circle;
use crate::linalg::{
    det2, norm2, quat_about_x, quat_about_z, quat_inverse, quat_multiply, quat_normalize,
    quat_rotate,
};
use crate::pipeline::PipelineConfig;
use crate::{Matrix2, Quaternion, Vector2, Vector3};

/// Camera boresight in the camera frame.
pub const BORESIGHT: Vector3 = Vector3::new(0.0, 0.0, -1.0);

/// Why an estimate was withheld. The discriminants are the telemetry codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RejectionCode {
    /// Estimate is usable.
    Valid = 0,
    /// Fewer edge points than `min_edge_points`: no horizon in view.
    InsufficientEdgePoints = 1,
    /// Fitted radius below `min_circle_radius`: the fit locked onto an
    /// artifact rather than the horizon.
    FitRadiusTooSmall = 2,
}

impl RejectionCode {
    pub fn as_code(self) -> u8 {
        self as u8
    }

    pub fn is_valid(self) -> bool {
        self == RejectionCode::Valid
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionCode::Valid => write!(f, "valid"),
            RejectionCode::InsufficientEdgePoints => write!(f, "insufficient edge points"),
            RejectionCode::FitRadiusTooSmall => write!(f, "fit radius too small"),
        }
    }
}

/// Roll, pitch and yaw in radians, as derived (before sign reversal).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

/// Attitude derived from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeEstimate {
    /// Unit nadir vector in the camera frame; all zeros when rejected.
    pub nadir: Vector3,
    /// Local-level to camera rotation; all zeros when rejected.
    pub orientation: Quaternion,
    /// Zero when rejected.
    pub euler: EulerAngles,
    pub rejection: RejectionCode,
}

impl AttitudeEstimate {
    /// The all-zero "no estimate" sentinel.
    pub fn rejected(rejection: RejectionCode) -> Self {
        Self {
            nadir: Vector3::zeros(),
            orientation: Quaternion::new(0.0, 0.0, 0.0, 0.0),
            euler: EulerAngles::default(),
            rejection,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_valid()
    }
}

/// Signed roll angle (radians) from the circle centre's offset.
///
/// Zero when the circle is centred on the image.
pub fn find_roll(circle: &Circle) -> f32 {
    let to_centre = -circle.center;
    let length = norm2(&to_centre);
    if length <= 0.0 {
        return 0.0;
    }
    let v1 = to_centre / length;
    let v2 = Vector2::new(0.0, 1.0);
    let theta = v1.dot(&v2).clamp(-1.0, 1.0).acos();

    let a = Matrix2::new(v1.x, v2.x, v1.y, v2.y);
    if det2(&a) < 0.0 {
        -theta
    } else {
        theta
    }
}

/// Angle (radians) between boresight and nadir.
///
/// The horizon vertex, the circle point nearest the image centre, sits
/// `|c| - r` pixels out; negative when the image centre is inside the disc.
pub fn find_pitch(
    circle: &Circle,
    altitude_km: f32,
    earth_radius_km: f32,
    camera: &CameraModel,
) -> f32 {
    let vertex_offset = norm2(&circle.center) - circle.radius;
    let earth_angular_radius = (earth_radius_km / (earth_radius_km + altitude_km))
        .clamp(-1.0, 1.0)
        .asin();
    camera.off_axis_angle(vertex_offset) + earth_angular_radius
}

/// Combined roll/pitch rotation, `q_roll * q_pitch`.
pub fn roll_pitch_quaternion(roll: f32, pitch: f32) -> Quaternion {
    quat_multiply(&quat_about_z(-roll), &quat_about_x(-pitch))
}

/// Yaw angle (radians) from the camera-frame magnetic field.
///
/// Zero when the field has no component perpendicular to nadir.
pub fn find_yaw(roll_pitch: &Quaternion, field: &Vector3) -> f32 {
    let nadir = quat_rotate(roll_pitch, &BORESIGHT);
    let horizontal = field - nadir * field.dot(&nadir);
    let length = horizontal.norm();
    if !(length > f32::EPSILON * field.norm()) {
        return 0.0;
    }
    let north = quat_rotate(&quat_inverse(roll_pitch), &(horizontal / length));
    north.x.atan2(north.y)
}

/// Gate a fit before trusting it. Edge count is checked first.
pub fn check_validity(
    num_edge_points: usize,
    circle: &Circle,
    config: &PipelineConfig,
) -> RejectionCode {
    if num_edge_points < config.min_edge_points {
        RejectionCode::InsufficientEdgePoints
    } else if !(circle.radius >= config.min_circle_radius) {
        RejectionCode::FitRadiusTooSmall
    } else {
        RejectionCode::Valid
    }
}

/// Derive nadir and orientation from a fitted circle.
///
/// `field` is the magnetic field in the camera frame (any scale).
pub fn estimate_attitude(
    circle: &Circle,
    num_edge_points: usize,
    altitude_km: f32,
    field: &Vector3,
    config: &PipelineConfig,
) -> AttitudeEstimate {
    let rejection = check_validity(num_edge_points, circle, config);
    if !rejection.is_valid() {
        debug!(
            "Rejected: {} ({} edge points, radius {:.2})",
            rejection, num_edge_points, circle.radius
        );
        return AttitudeEstimate::rejected(rejection);
    }

    let roll = find_roll(circle);
    let pitch = find_pitch(circle, altitude_km, config.earth_radius_km, &config.camera);
    let roll_pitch = roll_pitch_quaternion(roll, pitch);
    let yaw = find_yaw(&roll_pitch, field);

    let orientation = quat_normalize(&quat_multiply(&roll_pitch, &quat_about_z(-yaw)));
    let nadir = quat_rotate(&orientation, &BORESIGHT);

    debug!(
        "Attitude: roll {:.3}°, pitch {:.3}°, yaw {:.3}°",
        roll.to_degrees(),
        pitch.to_degrees(),
        yaw.to_degrees()
    );

    AttitudeEstimate {
        nadir,
        orientation,
        euler: EulerAngles { roll, pitch, yaw },
        rejection,
    }
}
